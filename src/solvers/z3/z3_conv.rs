
use rustc_hash::FxHashMap;

use z3::ast::{Ast, Bool, Dynamic, Int, BV};

use crate::error::Result;
use crate::expr::Expr;

use super::super::smt::smt_conv::{Convert, Decide};
use super::super::solver::{Model, SolverResult};

/// Translation onto the z3 crate over quantifier-free linear integer
/// arithmetic, with bitwise terms routed through 64-bit bit-vectors. One
/// instance per analysis; z3 contexts are not shared across threads.
pub struct Z3Conv<'ctx> {
  z3_ctx: &'ctx z3::Context,
  z3_solver: z3::Solver<'ctx>,
  /// Declared constants by name, for model extraction after Sat.
  vars: FxHashMap<String, Dynamic<'ctx>>,
  last_model: Model,
}

impl<'ctx> Z3Conv<'ctx> {
  pub fn new(z3_ctx: &'ctx z3::Context) -> Self {
    let z3_solver = z3::Solver::new(z3_ctx);
    Z3Conv { z3_ctx, z3_solver, vars: FxHashMap::default(), last_model: Model::default() }
  }

  /// Bitwise terms evaluate over 64-bit vectors and come back as
  /// integers, matching the i64 constants of the expression language.
  fn to_bv(&self, ast: &Dynamic<'ctx>) -> BV<'ctx> {
    BV::from_int(&ast.as_int().expect("operand is not integer"), 64)
  }

  fn extract_model(&mut self) {
    self.last_model = Model::default();
    let Some(model) = self.z3_solver.get_model() else { return };
    for (name, ast) in &self.vars {
      let Some(value) = model.eval(ast, true) else { continue };
      if let Some(b) = value.as_bool().and_then(|b| b.as_bool()) {
        self.last_model.bool_values.insert(name.clone(), b);
      } else if let Some(i) = value.as_int().and_then(|i| i.as_i64()) {
        self.last_model.int_values.insert(name.clone(), i);
      }
    }
  }
}

impl<'ctx> Decide for Z3Conv<'ctx> {
  fn assert_expr(&mut self, expr: &Expr) -> Result<()> {
    let a = self.convert_ast(expr)?;
    self.z3_solver.assert(&a.as_bool().expect("the assertion is not bool"));
    Ok(())
  }

  fn push(&mut self) {
    self.z3_solver.push();
  }

  fn pop(&mut self) {
    self.z3_solver.pop(1);
  }

  fn reset(&mut self) {
    self.z3_solver.reset();
    self.vars.clear();
  }

  fn set_timeout(&mut self, milliseconds: u64) {
    let mut params = z3::Params::new(self.z3_ctx);
    params.set_u32("timeout", milliseconds as u32);
    self.z3_solver.set_params(&params);
  }

  fn dec_check(&mut self) -> SolverResult {
    match self.z3_solver.check() {
      z3::SatResult::Sat => {
        self.extract_model();
        SolverResult::Sat
      }
      z3::SatResult::Unsat => SolverResult::Unsat,
      z3::SatResult::Unknown => SolverResult::Unknown,
    }
  }

  fn model(&self) -> Model {
    self.last_model.clone()
  }
}

impl<'ctx> Convert<z3::Sort<'ctx>, Dynamic<'ctx>> for Z3Conv<'ctx> {
  fn mk_smt_bool(&mut self, b: bool) -> Dynamic<'ctx> {
    Dynamic::from(Bool::from_bool(self.z3_ctx, b))
  }

  fn mk_smt_int(&mut self, i: i64) -> Dynamic<'ctx> {
    Dynamic::from(Int::from_i64(self.z3_ctx, i))
  }

  fn mk_int_var(&mut self, name: &str) -> Dynamic<'ctx> {
    let var = Dynamic::from(Int::new_const(self.z3_ctx, name));
    self.vars.insert(name.to_string(), var.clone());
    var
  }

  fn mk_bool_var(&mut self, name: &str) -> Dynamic<'ctx> {
    let var = Dynamic::from(Bool::new_const(self.z3_ctx, name));
    self.vars.insert(name.to_string(), var.clone());
    var
  }

  fn mk_add(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs.as_int().expect("lhs is not integer") + rhs.as_int().expect("rhs is not integer"))
  }

  fn mk_sub(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs.as_int().expect("lhs is not integer") - rhs.as_int().expect("rhs is not integer"))
  }

  fn mk_mul(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs.as_int().expect("lhs is not integer") * rhs.as_int().expect("rhs is not integer"))
  }

  fn mk_div(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs.as_int().expect("lhs is not integer") / rhs.as_int().expect("rhs is not integer"))
  }

  fn mk_rem(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs.as_int().expect("lhs is not integer") % rhs.as_int().expect("rhs is not integer"))
  }

  fn mk_bitand(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(self.to_bv(&lhs).bvand(&self.to_bv(&rhs)).to_int(true))
  }

  fn mk_bitor(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(self.to_bv(&lhs).bvor(&self.to_bv(&rhs)).to_int(true))
  }

  fn mk_bitxor(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(self.to_bv(&lhs).bvxor(&self.to_bv(&rhs)).to_int(true))
  }

  fn mk_bitnot(&mut self, operand: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(self.to_bv(&operand).bvnot().to_int(true))
  }

  fn mk_eq(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs._eq(&rhs))
  }

  fn mk_ne(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs._eq(&rhs).not())
  }

  fn mk_lt(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs.as_int().expect("lhs is not integer").lt(&rhs.as_int().expect("rhs is not integer")))
  }

  fn mk_le(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs.as_int().expect("lhs is not integer").le(&rhs.as_int().expect("rhs is not integer")))
  }

  fn mk_gt(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs.as_int().expect("lhs is not integer").gt(&rhs.as_int().expect("rhs is not integer")))
  }

  fn mk_ge(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(lhs.as_int().expect("lhs is not integer").ge(&rhs.as_int().expect("rhs is not integer")))
  }

  fn mk_and(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(Bool::and(
      self.z3_ctx,
      &[&lhs.as_bool().expect("lhs is not bool"), &rhs.as_bool().expect("rhs is not bool")],
    ))
  }

  fn mk_or(&mut self, lhs: Dynamic<'ctx>, rhs: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(Bool::or(
      self.z3_ctx,
      &[&lhs.as_bool().expect("lhs is not bool"), &rhs.as_bool().expect("rhs is not bool")],
    ))
  }

  fn mk_not(&mut self, operand: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(operand.as_bool().expect("operand is not bool").not())
  }

  fn mk_neg(&mut self, operand: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(-operand.as_int().expect("operand is not integer"))
  }

  fn mk_implies(&mut self, cond: Dynamic<'ctx>, conseq: Dynamic<'ctx>) -> Dynamic<'ctx> {
    Dynamic::from(
      cond
        .as_bool()
        .expect("cond is not bool")
        .implies(&conseq.as_bool().expect("conseq is not bool")),
    )
  }
}
