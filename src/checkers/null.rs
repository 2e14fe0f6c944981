
use crate::expr::{Expr, ExprBuilder, ExprCtx};
use crate::ir::{Instruction, Opcode, ValueRef};
use crate::report::{Report, Severity, VulnerabilityKind};
use crate::solvers::SolverResult;
use crate::state::SymbolicState;
use crate::symex::eval_operand;

use super::{CheckCtx, Checker};

/// Dereference check for loads and stores. A pointer that cannot be
/// proven non-null under the path constraint is reported; addresses that
/// come from a tracked allocation are non-null by construction.
pub struct NullPointerChecker;

fn comes_from_allocation(ctx: &ExprCtx, state: &SymbolicState, value: &ValueRef) -> bool {
  if let Some(inst) = value.as_inst() {
    match inst.opcode() {
      Opcode::Alloca => return true,
      Opcode::GetElementPtr => {
        if let Some(base) = inst.operand(0) {
          return comes_from_allocation(ctx, state, base);
        }
      }
      _ => {}
    }
  }
  let addr = eval_operand(ctx, state, value);
  state.heap().object(&addr).is_some()
}

impl Checker for NullPointerChecker {
  fn name(&self) -> &'static str {
    "NullPointerDereference"
  }

  fn check(&self, cx: &mut CheckCtx, state: &SymbolicState, inst: &Instruction) -> Option<Report> {
    let ptr_value = match inst.opcode() {
      Opcode::Load => inst.operand(0)?,
      Opcode::Store => inst.operand(1)?,
      _ => return None,
    };

    if comes_from_allocation(cx.expr_ctx, state, ptr_value) {
      return None;
    }

    let ptr = eval_operand(cx.expr_ctx, state, ptr_value);
    if let Some(c) = ptr.extract_int() {
      if c != 0 {
        return None;
      }
    }

    let mut query: Vec<Expr> = state.path_constraint().constraints().to_vec();
    query.push(cx.expr_ctx.eq(ptr.clone(), cx.expr_ctx.constant_int(0)));

    match cx.solver.check(&query) {
      // not provably non-null: Sat gives a witness, Unknown and Error
      // cannot rule one out
      SolverResult::Sat | SolverResult::Unknown | SolverResult::Error => {
        let mut report = Report::new(
          VulnerabilityKind::NullPointerDereference,
          Severity::Critical,
          inst.loc(),
          "Null pointer dereference detected",
        );
        report.counterexample.insert(format!("{ptr:?}"), "0".into());
        for (var, val) in cx.solver.model().int_values {
          report.counterexample.insert(var, val.to_string());
        }
        report.fix_suggestions.push("Add null pointer check before dereferencing".into());
        report.fix_suggestions.push("Use assertions to validate pointer assumptions".into());
        report
          .fix_suggestions
          .push("Initialize pointers to valid addresses or NULL".into());
        Some(report)
      }
      SolverResult::Unsat => None,
    }
  }
}
