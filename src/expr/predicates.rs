
//! Safety predicates layered on the expression builder. Each returns the
//! formula a checker negates or discharges directly.

use super::context::{ExprBuilder, ExprCtx};
use super::expr::Expr;

/// `base <= ptr < base + size`.
pub fn buffer_access(ctx: &ExprCtx, ptr: Expr, base: Expr, size: Expr) -> Expr {
  let upper = ctx.add(base.clone(), size);
  ctx.and(ctx.ge(ptr.clone(), base), ctx.lt(ptr, upper))
}

/// `ptr != 0`.
pub fn pointer_non_null(ctx: &ExprCtx, ptr: Expr) -> Expr {
  ctx.ne(ptr, ctx.constant_int(0))
}

pub fn pointer_valid(ctx: &ExprCtx, ptr: Expr) -> Expr {
  pointer_non_null(ctx, ptr)
}

pub fn pointer_in_range(ctx: &ExprCtx, ptr: Expr, base: Expr, size: Expr) -> Expr {
  buffer_access(ctx, ptr, base, size)
}

/// Largest value of a `width`-bit unsigned integer, saturating at i64 range.
fn unsigned_max(width: u8) -> i64 {
  if width >= 63 {
    i64::MAX
  } else {
    (1i64 << width) - 1
  }
}

/// Unsigned wrap-around formulated as `a + b < a`; meaningful under
/// bit-vector evaluation. The signed form stays constant-false: to be
/// refined with bit-vector theory.
pub fn add_overflow(ctx: &ExprCtx, a: Expr, b: Expr, signed: bool) -> Expr {
  if signed {
    ctx._false()
  } else {
    ctx.lt(ctx.add(a.clone(), b), a)
  }
}

/// Width-aware unsigned form for integer-theory backends:
/// `a + b > 2^width - 1`.
pub fn add_overflow_with_width(ctx: &ExprCtx, a: Expr, b: Expr, width: u8) -> Expr {
  ctx.gt(ctx.add(a, b), ctx.constant_int(unsigned_max(width)))
}

/// Unsigned borrow: `a < b`. Signed form constant-false, as above.
pub fn sub_overflow(ctx: &ExprCtx, a: Expr, b: Expr, signed: bool) -> Expr {
  if signed {
    ctx._false()
  } else {
    ctx.lt(a, b)
  }
}

/// Multiplication overflow needs the product's width to say anything in
/// integer arithmetic; without one the predicate is constant-false.
pub fn mul_overflow(ctx: &ExprCtx, _a: Expr, _b: Expr, _signed: bool) -> Expr {
  ctx._false()
}

pub fn mul_overflow_with_width(ctx: &ExprCtx, a: Expr, b: Expr, width: u8) -> Expr {
  ctx.gt(ctx.mul(a, b), ctx.constant_int(unsigned_max(width)))
}

// Float predicates are placeholders until a float theory is wired in.

pub fn float_is_nan(ctx: &ExprCtx, _e: Expr) -> Expr {
  ctx._false()
}

pub fn float_is_inf(ctx: &ExprCtx, _e: Expr) -> Expr {
  ctx._false()
}

pub fn float_is_finite(ctx: &ExprCtx, _e: Expr) -> Expr {
  ctx._true()
}

pub fn float_division_by_zero(ctx: &ExprCtx, divisor: Expr) -> Expr {
  ctx.eq(divisor, ctx.constant_int(0))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::context::new_ctx;
  use crate::symbol::nstring::NString;

  #[test]
  fn buffer_access_shape() {
    let ctx = new_ctx();
    let ptr = ctx.variable(NString::from("p"));
    let base = ctx.variable(NString::from("b"));
    let size = ctx.constant_int(10);
    let e = buffer_access(&ctx, ptr, base, size);
    assert_eq!(format!("{e:?}"), "((p >= b) && (p < (b + 10)))");
  }

  #[test]
  fn non_null_shape() {
    let ctx = new_ctx();
    let p = ctx.variable(NString::from("p"));
    assert_eq!(format!("{:?}", pointer_non_null(&ctx, p)), "(p != 0)");
  }

  #[test]
  fn signed_overflow_is_disabled() {
    let ctx = new_ctx();
    let a = ctx.variable(NString::from("a"));
    let b = ctx.variable(NString::from("b"));
    assert!(add_overflow(&ctx, a.clone(), b.clone(), true).is_false());
    assert!(sub_overflow(&ctx, a.clone(), b.clone(), true).is_false());
    assert!(mul_overflow(&ctx, a, b, false).is_false());
  }

  #[test]
  fn unsigned_overflow_shapes() {
    let ctx = new_ctx();
    let a = ctx.variable(NString::from("a"));
    let b = ctx.variable(NString::from("b"));
    let e = add_overflow(&ctx, a.clone(), b.clone(), false);
    assert_eq!(format!("{e:?}"), "((a + b) < a)");
    let e = sub_overflow(&ctx, a.clone(), b.clone(), false);
    assert_eq!(format!("{e:?}"), "(a < b)");
    let e = add_overflow_with_width(&ctx, a, b, 32);
    assert_eq!(format!("{e:?}"), "((a + b) > 4294967295)");
  }

  #[test]
  fn unsigned_max_saturates() {
    assert_eq!(super::unsigned_max(8), 255);
    assert_eq!(super::unsigned_max(63), i64::MAX);
    assert_eq!(super::unsigned_max(64), i64::MAX);
  }
}
