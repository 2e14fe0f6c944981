
use std::fmt::Debug;
use std::slice::Iter;

use log::warn;

use crate::expr::{Expr, ExprBuilder, ExprCtx};
use crate::solvers::{Solver, SolverResult};

/// Ordered conjunction of branch conditions collected along a path.
#[derive(Clone, Default)]
pub struct PathConstraint {
  constraints: Vec<Expr>,
}

impl PathConstraint {
  pub fn new() -> Self {
    PathConstraint { constraints: Vec::new() }
  }

  pub fn add(&mut self, mut constraint: Expr) {
    constraint.simplify();
    // conjoining true changes nothing
    if !constraint.is_true() {
      self.constraints.push(constraint);
    }
  }

  pub fn constraints(&self) -> &[Expr] {
    &self.constraints
  }

  pub fn iter(&self) -> Iter<'_, Expr> {
    self.constraints.iter()
  }

  pub fn len(&self) -> usize {
    self.constraints.len()
  }

  pub fn is_empty(&self) -> bool {
    self.constraints.is_empty()
  }

  /// The whole constraint as one conjunction; `true` when empty.
  pub fn conjunction(&self, ctx: &ExprCtx) -> Expr {
    let mut iter = self.constraints.iter().cloned();
    match iter.next() {
      None => ctx._true(),
      Some(first) => iter.fold(first, |acc, c| ctx.and(acc, c)),
    }
  }

  /// Satisfiability through the solver. Unknown and Error keep the path
  /// alive; only a definite Unsat may prune.
  pub fn is_satisfiable(&self, solver: &mut Solver) -> bool {
    if self.constraints.is_empty() {
      return true;
    }
    match solver.check(&self.constraints) {
      SolverResult::Unsat => false,
      SolverResult::Sat => true,
      SolverResult::Unknown | SolverResult::Error => {
        warn!("solver gave no definite answer, assuming satisfiable");
        true
      }
    }
  }
}

impl Debug for PathConstraint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "[")?;
    for (i, c) in self.constraints.iter().enumerate() {
      write!(f, "  {c:?}")?;
      if i + 1 < self.constraints.len() {
        write!(f, " &&")?;
      }
      writeln!(f)?;
    }
    write!(f, "]")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::{new_ctx, ExprBuilder};
  use crate::symbol::nstring::NString;

  #[test]
  fn empty_constraint_is_satisfiable() {
    let pc = PathConstraint::new();
    let mut solver = Solver::stub();
    assert!(pc.is_satisfiable(&mut solver));
  }

  #[test]
  fn stub_backend_keeps_paths_alive() {
    let ctx = new_ctx();
    let mut pc = PathConstraint::new();
    let x = ctx.variable(NString::from("x"));
    pc.add(ctx.eq(x.clone(), ctx.constant_int(0)));
    pc.add(ctx.ne(x, ctx.constant_int(0)));

    let mut solver = Solver::stub();
    assert!(pc.is_satisfiable(&mut solver));
  }

  #[test]
  fn conjunction_folds_the_list() {
    let ctx = new_ctx();
    let mut pc = PathConstraint::new();
    assert!(pc.conjunction(&ctx).is_true());

    let p = ctx.as_bool(ctx.variable(NString::from("p")));
    let q = ctx.as_bool(ctx.variable(NString::from("q")));
    pc.add(p.clone());
    assert_eq!(pc.conjunction(&ctx), p.clone());
    pc.add(q.clone());
    assert_eq!(pc.conjunction(&ctx), ctx.and(p, q));
  }

  #[test]
  fn adding_true_is_a_no_op() {
    let ctx = new_ctx();
    let mut pc = PathConstraint::new();
    pc.add(ctx._true());
    assert!(pc.is_empty());
  }

  #[test]
  fn constraints_are_simplified_on_entry() {
    let ctx = new_ctx();
    let p = ctx.as_bool(ctx.variable(NString::from("p")));
    let mut pc = PathConstraint::new();
    pc.add(ctx.and(ctx._true(), p.clone()));
    assert_eq!(pc.constraints(), &[p]);
  }

  #[cfg(feature = "z3")]
  #[test]
  fn contradiction_is_unsatisfiable_with_a_real_backend() {
    use crate::solvers::SolverCtx;

    let ctx = new_ctx();
    let mut pc = PathConstraint::new();
    let x = ctx.variable(NString::from("x"));
    pc.add(ctx.eq(x.clone(), ctx.constant_int(0)));
    pc.add(ctx.ne(x, ctx.constant_int(0)));

    let solver_ctx = SolverCtx::new();
    let mut solver = Solver::new(&solver_ctx);
    assert!(!pc.is_satisfiable(&mut solver));
  }
}
