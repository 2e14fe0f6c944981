
use std::collections::BTreeMap;
use std::fmt::Debug;

use log::warn;

use crate::expr::{Expr, ExprBuilder};

use super::smt::smt_conv::Decide;
use super::stub::StubConv;

/// Answer of a satisfiability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverResult {
  Sat,
  Unsat,
  Unknown,
  Error,
}

/// Counter-example extracted from a Sat answer.
#[derive(Default, Clone, PartialEq)]
pub struct Model {
  pub int_values: BTreeMap<String, i64>,
  pub float_values: BTreeMap<String, f64>,
  pub bool_values: BTreeMap<String, bool>,
}

impl Model {
  pub fn is_empty(&self) -> bool {
    self.int_values.is_empty() && self.float_values.is_empty() && self.bool_values.is_empty()
  }
}

impl Debug for Model {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "Counter Example:")?;
    for (var, val) in &self.int_values {
      writeln!(f, "  {var} = {val}")?;
    }
    for (var, val) in &self.float_values {
      writeln!(f, "  {var} = {val}")?;
    }
    for (var, val) in &self.bool_values {
      writeln!(f, "  {var} = {val}")?;
    }
    Ok(())
  }
}

/// Owner of backend-global state. Backends that need a long-lived context
/// (z3) keep it here so the facade can borrow it; each analysis thread
/// holds its own, contexts are never shared.
pub struct SolverCtx {
  #[cfg(feature = "z3")]
  pub(super) z3_ctx: ::z3::Context,
}

impl SolverCtx {
  pub fn new() -> Self {
    #[cfg(feature = "z3")]
    {
      let mut cfg = ::z3::Config::new();
      cfg.set_model_generation(true);
      SolverCtx { z3_ctx: ::z3::Context::new(&cfg) }
    }
    #[cfg(not(feature = "z3"))]
    SolverCtx {}
  }
}

impl Default for SolverCtx {
  fn default() -> Self {
    SolverCtx::new()
  }
}

/// Facade over a decision-procedure backend. With the `z3` feature the
/// backend is the real solver; otherwise a stub that answers Sat with an
/// empty model, which keeps pruning sound at the cost of precision.
pub struct Solver<'ctx> {
  backend: Box<dyn Decide + 'ctx>,
}

impl<'ctx> Solver<'ctx> {
  #[cfg(feature = "z3")]
  pub fn new(ctx: &'ctx SolverCtx) -> Self {
    Solver { backend: Box::new(super::z3::z3_conv::Z3Conv::new(&ctx.z3_ctx)) }
  }

  #[cfg(not(feature = "z3"))]
  pub fn new(_ctx: &'ctx SolverCtx) -> Self {
    Solver { backend: Box::new(StubConv::new()) }
  }

  /// Explicit stub regardless of features; used when a caller wants the
  /// conservative backend.
  pub fn stub() -> Self {
    Solver { backend: Box::new(StubConv::new()) }
  }

  pub fn with_backend(backend: Box<dyn Decide + 'ctx>) -> Self {
    Solver { backend }
  }

  /// Satisfiability of a constraint conjunction. Translation failures
  /// degrade to Unknown; callers pick the conservative reading.
  pub fn check(&mut self, constraints: &[Expr]) -> SolverResult {
    self.backend.reset();
    for c in constraints {
      if let Err(e) = self.backend.assert_expr(c) {
        warn!("constraint translation failed, treating check as unknown: {e}");
        return SolverResult::Unknown;
      }
    }
    self.backend.dec_check()
  }

  /// Satisfiability of a single formula.
  pub fn check_expr(&mut self, expr: &Expr) -> SolverResult {
    self.check(std::slice::from_ref(expr))
  }

  /// A formula is valid iff its negation is unsatisfiable.
  pub fn is_valid(&mut self, expr: &Expr) -> bool {
    let negated = expr.ctx.not(expr.clone());
    self.check_expr(&negated) == SolverResult::Unsat
  }

  pub fn push(&mut self) {
    self.backend.push();
  }

  pub fn pop(&mut self) {
    self.backend.pop();
  }

  pub fn add_assertion(&mut self, expr: &Expr) -> crate::error::Result<()> {
    self.backend.assert_expr(expr)
  }

  pub fn reset(&mut self) {
    self.backend.reset();
  }

  /// Applies to subsequent `check` calls.
  pub fn set_timeout(&mut self, milliseconds: u64) {
    self.backend.set_timeout(milliseconds);
  }

  /// The last counter-example.
  pub fn model(&self) -> Model {
    self.backend.model()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::{new_ctx, ExprBuilder};
  use crate::symbol::nstring::NString;

  #[test]
  fn stub_answers_sat_with_empty_model() {
    let ctx = new_ctx();
    let mut solver = Solver::stub();
    let x = ctx.variable(NString::from("x"));
    let contradiction = ctx.and(ctx.eq(x.clone(), ctx.constant_int(0)), ctx.ne(x, ctx.constant_int(0)));
    assert_eq!(solver.check_expr(&contradiction), SolverResult::Sat);
    assert!(solver.model().is_empty());
  }

  #[test]
  fn stub_is_never_valid() {
    // The stub cannot prove validity; is_valid needs an Unsat answer.
    let ctx = new_ctx();
    let mut solver = Solver::stub();
    assert!(!solver.is_valid(&ctx._true()));
  }

  #[test]
  fn translation_failure_degrades_to_unknown() {
    let ctx = new_ctx();
    let mut solver = Solver::stub();
    let x = ctx.variable(NString::from("x"));
    let y = ctx.variable(NString::from("y"));
    // non-constant shift amount
    let bad = ctx.eq(ctx.shl(x.clone(), y), x);
    assert_eq!(solver.check_expr(&bad), SolverResult::Unknown);
  }

  #[test]
  fn bitwise_terms_translate() {
    let ctx = new_ctx();
    let mut solver = Solver::stub();
    let x = ctx.variable(NString::from("x"));
    let y = ctx.variable(NString::from("y"));
    let e = ctx.eq(
      ctx.bitxor(ctx.bitand(x.clone(), y.clone()), ctx.bitor(x.clone(), ctx.bitnot(y))),
      ctx.constant_int(0),
    );
    assert_eq!(solver.check_expr(&e), SolverResult::Sat);
  }

  #[cfg(feature = "z3")]
  mod with_z3 {
    use super::*;

    #[test]
    fn sat_and_unsat() {
      let ctx = new_ctx();
      let solver_ctx = SolverCtx::new();
      let mut solver = Solver::new(&solver_ctx);

      let x = ctx.variable(NString::from("x"));
      let sat = ctx.lt(x.clone(), ctx.constant_int(10));
      assert_eq!(solver.check_expr(&sat), SolverResult::Sat);

      let unsat = ctx.and(
        ctx.lt(x.clone(), ctx.constant_int(0)),
        ctx.gt(x.clone(), ctx.constant_int(0)),
      );
      assert_eq!(solver.check_expr(&unsat), SolverResult::Unsat);
    }

    #[test]
    fn model_extraction() {
      let ctx = new_ctx();
      let solver_ctx = SolverCtx::new();
      let mut solver = Solver::new(&solver_ctx);

      let x = ctx.variable(NString::from("x"));
      let q = ctx.eq(x, ctx.constant_int(7));
      assert_eq!(solver.check_expr(&q), SolverResult::Sat);
      assert_eq!(solver.model().int_values.get("x"), Some(&7));
    }

    #[test]
    fn validity() {
      let ctx = new_ctx();
      let solver_ctx = SolverCtx::new();
      let mut solver = Solver::new(&solver_ctx);

      let x = ctx.variable(NString::from("x"));
      let tautology = ctx.or(ctx.ge(x.clone(), ctx.constant_int(0)), ctx.lt(x, ctx.constant_int(0)));
      assert!(solver.is_valid(&tautology));
      assert!(!solver.is_valid(&ctx._false()));
    }

    #[test]
    fn bitwise_ops_evaluate_over_bit_vectors() {
      let ctx = new_ctx();
      let solver_ctx = SolverCtx::new();
      let mut solver = Solver::new(&solver_ctx);

      // 12 & 10 == 8, 12 | 10 == 14, 12 ^ 10 == 6, ~0 == -1
      let a = ctx.constant_int(12);
      let b = ctx.constant_int(10);
      assert!(solver.is_valid(&ctx.eq(ctx.bitand(a.clone(), b.clone()), ctx.constant_int(8))));
      assert!(solver.is_valid(&ctx.eq(ctx.bitor(a.clone(), b.clone()), ctx.constant_int(14))));
      assert!(solver.is_valid(&ctx.eq(ctx.bitxor(a, b), ctx.constant_int(6))));
      assert!(solver.is_valid(&ctx.eq(ctx.bitnot(ctx.constant_int(0)), ctx.constant_int(-1))));

      // and symbolic operands stay solvable: x & 12 == 8 has witnesses
      let x = ctx.variable(NString::from("x"));
      let q = ctx.eq(ctx.bitand(x, ctx.constant_int(12)), ctx.constant_int(8));
      assert_eq!(solver.check_expr(&q), SolverResult::Sat);
    }

    #[test]
    fn constant_shift_translates() {
      let ctx = new_ctx();
      let solver_ctx = SolverCtx::new();
      let mut solver = Solver::new(&solver_ctx);

      let x = ctx.variable(NString::from("x"));
      // x << 2 == 12 has the solution x = 3
      let q = ctx.eq(ctx.shl(x, ctx.constant_int(2)), ctx.constant_int(12));
      assert_eq!(solver.check_expr(&q), SolverResult::Sat);
      assert_eq!(solver.model().int_values.get("x"), Some(&3));
    }
  }
}
