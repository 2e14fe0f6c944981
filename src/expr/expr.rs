
use std::fmt::Debug;
use std::hash::Hash;

use crate::symbol::nstring::NString;

use super::ast::{NodeId, Sort};
use super::context::{Context, ExprBuilder, ExprCtx};
use super::op::{BinOp, UnOp};

/// `Expr` is a wrapper for an AST node: it carries the node index and a
/// handle on the owning context. Since the context hash-conses, id equality
/// is structural equality.
#[derive(Clone)]
pub struct Expr {
  pub ctx: ExprCtx,
  id: NodeId,
}

impl Expr {
  pub(super) fn new(ctx: ExprCtx, id: NodeId) -> Self {
    Expr { ctx, id }
  }

  pub fn id(&self) -> NodeId {
    self.id
  }

  pub fn sort(&self) -> Sort {
    self.ctx.borrow().sort(self.id)
  }

  pub fn is_terminal(&self) -> bool {
    self.ctx.borrow().is_terminal(self.id)
  }

  pub fn is_true(&self) -> bool {
    self.ctx.borrow().is_true(self.id)
  }

  pub fn is_false(&self) -> bool {
    self.ctx.borrow().is_false(self.id)
  }

  pub fn is_constant(&self) -> bool {
    self.ctx.borrow().is_constant(self.id)
  }

  pub fn is_variable(&self) -> bool {
    self.ctx.borrow().is_variable(self.id)
  }

  pub fn is_binary(&self) -> bool {
    self.ctx.borrow().is_binary(self.id)
  }

  pub fn is_unary(&self) -> bool {
    self.ctx.borrow().is_unary(self.id)
  }

  pub fn extract_int(&self) -> Option<i64> {
    self.ctx.borrow().extract_int(self.id)
  }

  pub fn extract_var(&self) -> Option<NString> {
    self.ctx.borrow().extract_var(self.id)
  }

  pub fn extract_bin_op(&self) -> BinOp {
    self.ctx.borrow().extract_bin_op(self.id).expect("not a binary expr")
  }

  pub fn extract_un_op(&self) -> UnOp {
    self.ctx.borrow().extract_un_op(self.id).expect("not a unary expr")
  }

  /// Construct sub-exprs from AST
  pub fn sub_exprs(&self) -> Option<Vec<Expr>> {
    let ids = self.ctx.borrow().sub_nodes(self.id);
    ids.map(|ids| ids.into_iter().map(|id| Expr { ctx: self.ctx.clone(), id }).collect())
  }

  /// Boolean-identity simplification: `true && x -> x`, `false || x -> x`,
  /// short-circuit constants, `!!x -> x`.
  pub fn simplify(&mut self) {
    let Some(mut sub_exprs) = self.sub_exprs() else { return };
    for sub in sub_exprs.iter_mut() {
      sub.simplify();
    }

    if self.is_binary() {
      let lhs = &sub_exprs[0];
      let rhs = &sub_exprs[1];
      match self.extract_bin_op() {
        BinOp::And => {
          if lhs.is_true() {
            self.id = rhs.id;
          } else if rhs.is_true() {
            self.id = lhs.id;
          } else if lhs.is_false() || rhs.is_false() {
            self.id = Context::FALSE_ID;
          } else {
            *self = self.ctx.and(lhs.clone(), rhs.clone());
          }
        }
        BinOp::Or => {
          if lhs.is_false() {
            self.id = rhs.id;
          } else if rhs.is_false() {
            self.id = lhs.id;
          } else if lhs.is_true() || rhs.is_true() {
            self.id = Context::TRUE_ID;
          } else {
            *self = self.ctx.or(lhs.clone(), rhs.clone());
          }
        }
        op => {
          *self = self.ctx.binary(op, lhs.clone(), rhs.clone());
        }
      }
      return;
    }

    if self.is_unary() {
      let operand = &sub_exprs[0];
      match self.extract_un_op() {
        UnOp::Not => {
          if operand.is_true() {
            self.id = Context::FALSE_ID;
          } else if operand.is_false() {
            self.id = Context::TRUE_ID;
          } else if operand.is_unary() && operand.extract_un_op() == UnOp::Not {
            self.id = operand.sub_exprs().unwrap().remove(0).id;
          } else {
            *self = self.ctx.not(operand.clone());
          }
        }
        op => {
          *self = self.ctx.unary(op, operand.clone());
        }
      }
    }
  }
}

impl PartialEq for Expr {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for Expr {}

impl Hash for Expr {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl Debug for Expr {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if self.is_terminal() {
      let ctx = self.ctx.borrow();
      return write!(f, "{:?}", ctx.terminal(self.id).unwrap());
    }

    let sub_exprs = self.sub_exprs().unwrap();
    if self.is_binary() {
      let lhs = &sub_exprs[0];
      let rhs = &sub_exprs[1];
      return write!(f, "({lhs:?} {:?} {rhs:?})", self.extract_bin_op());
    }

    write!(f, "{:?}{:?}", self.extract_un_op(), sub_exprs[0])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::context::new_ctx;

  #[test]
  fn infix_rendering_with_parentheses() {
    let ctx = new_ctx();
    let x = ctx.variable(NString::from("x"));
    let y = ctx.variable(NString::from("y"));
    let e = ctx.lt(ctx.add(x, ctx.constant_int(1)), y);
    assert_eq!(format!("{e:?}"), "((x + 1) < y)");
  }

  #[test]
  fn unary_rendering() {
    let ctx = new_ctx();
    let x = ctx.variable(NString::from("x"));
    let e = ctx.not(ctx.eq(x.clone(), ctx.constant_int(0)));
    assert_eq!(format!("{e:?}"), "!(x == 0)");
    assert_eq!(format!("{:?}", ctx.neg(x)), "-x");
  }

  #[test]
  fn structural_equality() {
    let ctx = new_ctx();
    let a = ctx.and(ctx._true(), ctx._false());
    let b = ctx.and(ctx._true(), ctx._false());
    assert_eq!(a, b);
  }

  #[test]
  fn simplify_boolean_identities() {
    let ctx = new_ctx();
    let x = ctx.variable(NString::from("x"));
    let p = ctx.as_bool(x);

    let mut e = ctx.and(ctx._true(), p.clone());
    e.simplify();
    assert_eq!(e, p);

    let mut e = ctx.or(p.clone(), ctx._true());
    e.simplify();
    assert!(e.is_true());

    let mut e = ctx.not(ctx.not(p.clone()));
    e.simplify();
    assert_eq!(e, p);

    let mut e = ctx.and(p.clone(), ctx._false());
    e.simplify();
    assert!(e.is_false());
  }

  #[test]
  fn simplify_descends_into_subterms() {
    let ctx = new_ctx();
    let x = ctx.as_bool(ctx.variable(NString::from("x")));
    let y = ctx.as_bool(ctx.variable(NString::from("y")));
    let mut e = ctx.or(ctx.and(ctx._true(), x.clone()), ctx.and(y, ctx._false()));
    e.simplify();
    assert_eq!(e, x);
  }
}
