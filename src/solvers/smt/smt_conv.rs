
use crate::error::{Result, VerifierError};
use crate::expr::ast::Sort;
use crate::expr::{BinOp, Expr, UnOp};

use super::super::solver::{Model, SolverResult};

/// Decision-procedure surface every backend provides. The facade drives
/// these; everything translation-specific lives in `Convert`.
pub trait Decide {
  fn assert_expr(&mut self, expr: &Expr) -> Result<()>;
  fn push(&mut self);
  fn pop(&mut self);
  fn reset(&mut self);
  fn set_timeout(&mut self, milliseconds: u64);
  fn dec_check(&mut self) -> SolverResult;
  /// Counter-example from the last Sat answer.
  fn model(&self) -> Model;
}

/// Structural translation from the expression language into a backend's
/// sort/ast pair. `convert_ast` is shared; backends supply the `mk_*`
/// primitives.
pub trait Convert<SmtSort, SmtAst> {
  fn convert_ast(&mut self, expr: &Expr) -> Result<SmtAst> {
    if expr.is_terminal() {
      if let Some(i) = expr.extract_int() {
        return Ok(self.mk_smt_int(i));
      }
      if let Some(name) = expr.extract_var() {
        return Ok(match expr.sort() {
          Sort::Bool => self.mk_bool_var(name.as_str()),
          Sort::Int => self.mk_int_var(name.as_str()),
        });
      }
      // only true/false remain
      return Ok(self.mk_smt_bool(expr.is_true()));
    }

    let sub_exprs = expr.sub_exprs().unwrap();

    if expr.is_binary() {
      let op = expr.extract_bin_op();

      // Shifts lower to scaling by a power of two, so the amount must be
      // a concrete constant.
      if matches!(op, BinOp::Shl | BinOp::Shr) {
        let amount = sub_exprs[1].extract_int().ok_or_else(|| {
          VerifierError::Translation(format!("non-constant shift amount in {expr:?}"))
        })?;
        if !(0..=62).contains(&amount) {
          return Err(VerifierError::Translation(format!("shift amount {amount} out of range")));
        }
        let lhs = self.convert_ast(&sub_exprs[0])?;
        let scale = self.mk_smt_int(1i64 << amount);
        return Ok(match op {
          BinOp::Shl => self.mk_mul(lhs, scale),
          _ => self.mk_div(lhs, scale),
        });
      }

      let lhs = self.convert_ast(&sub_exprs[0])?;
      let rhs = self.convert_ast(&sub_exprs[1])?;
      return Ok(match op {
        BinOp::Add => self.mk_add(lhs, rhs),
        BinOp::Sub => self.mk_sub(lhs, rhs),
        BinOp::Mul => self.mk_mul(lhs, rhs),
        BinOp::Div => self.mk_div(lhs, rhs),
        BinOp::Rem => self.mk_rem(lhs, rhs),
        BinOp::BitAnd => self.mk_bitand(lhs, rhs),
        BinOp::BitOr => self.mk_bitor(lhs, rhs),
        BinOp::BitXor => self.mk_bitxor(lhs, rhs),
        BinOp::Eq => self.mk_eq(lhs, rhs),
        BinOp::Ne => self.mk_ne(lhs, rhs),
        BinOp::Lt => self.mk_lt(lhs, rhs),
        BinOp::Le => self.mk_le(lhs, rhs),
        BinOp::Gt => self.mk_gt(lhs, rhs),
        BinOp::Ge => self.mk_ge(lhs, rhs),
        BinOp::And => self.mk_and(lhs, rhs),
        BinOp::Or => self.mk_or(lhs, rhs),
        BinOp::Implies => self.mk_implies(lhs, rhs),
        BinOp::Shl | BinOp::Shr => unreachable!(),
      });
    }

    let operand = self.convert_ast(&sub_exprs[0])?;
    Ok(match expr.extract_un_op() {
      UnOp::Not => self.mk_not(operand),
      UnOp::Neg => self.mk_neg(operand),
      UnOp::BitNot => self.mk_bitnot(operand),
    })
  }

  // constants
  fn mk_smt_bool(&mut self, b: bool) -> SmtAst;
  fn mk_smt_int(&mut self, i: i64) -> SmtAst;

  // variables, keyed by name
  fn mk_int_var(&mut self, name: &str) -> SmtAst;
  fn mk_bool_var(&mut self, name: &str) -> SmtAst;

  // terms
  fn mk_add(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_sub(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_mul(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_div(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_rem(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  // bitwise; integer backends round-trip through bit-vectors
  fn mk_bitand(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_bitor(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_bitxor(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_bitnot(&mut self, operand: SmtAst) -> SmtAst;
  fn mk_eq(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_ne(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_lt(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_le(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_gt(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_ge(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_and(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_or(&mut self, lhs: SmtAst, rhs: SmtAst) -> SmtAst;
  fn mk_not(&mut self, operand: SmtAst) -> SmtAst;
  fn mk_neg(&mut self, operand: SmtAst) -> SmtAst;
  fn mk_implies(&mut self, cond: SmtAst, conseq: SmtAst) -> SmtAst;
}
