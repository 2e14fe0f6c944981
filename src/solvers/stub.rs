
use crate::error::Result;
use crate::expr::Expr;

use super::smt::smt_conv::{Convert, Decide};
use super::solver::{Model, SolverResult};

/// Backend used when no decision procedure is linked. Every check answers
/// Sat with an empty model, so path pruning never discards a possibly
/// feasible path.
pub struct StubConv;

impl StubConv {
  pub fn new() -> Self {
    StubConv
  }
}

impl Default for StubConv {
  fn default() -> Self {
    StubConv::new()
  }
}

impl Decide for StubConv {
  fn assert_expr(&mut self, expr: &Expr) -> Result<()> {
    // Run the shared translation so unsupported shapes surface the same
    // TranslationError a real backend would hit.
    self.convert_ast(expr)?;
    Ok(())
  }

  fn push(&mut self) {}

  fn pop(&mut self) {}

  fn reset(&mut self) {}

  fn set_timeout(&mut self, _milliseconds: u64) {}

  fn dec_check(&mut self) -> SolverResult {
    SolverResult::Sat
  }

  fn model(&self) -> Model {
    Model::default()
  }
}

/// Sorts and asts carry no information here.
impl Convert<(), ()> for StubConv {
  fn mk_smt_bool(&mut self, _b: bool) {}
  fn mk_smt_int(&mut self, _i: i64) {}
  fn mk_int_var(&mut self, _name: &str) {}
  fn mk_bool_var(&mut self, _name: &str) {}
  fn mk_add(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_sub(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_mul(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_div(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_rem(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_bitand(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_bitor(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_bitxor(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_bitnot(&mut self, _operand: ()) {}
  fn mk_eq(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_ne(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_lt(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_le(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_gt(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_ge(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_and(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_or(&mut self, _lhs: (), _rhs: ()) {}
  fn mk_not(&mut self, _operand: ()) {}
  fn mk_neg(&mut self, _operand: ()) {}
  fn mk_implies(&mut self, _cond: (), _conseq: ()) {}
}
