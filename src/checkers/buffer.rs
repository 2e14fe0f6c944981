
use crate::expr::predicates;
use crate::expr::{Expr, ExprBuilder};
use crate::ir::{Instruction, Opcode};
use crate::report::{Report, Severity, VulnerabilityKind};
use crate::solvers::SolverResult;
use crate::state::SymbolicState;
use crate::symex::eval_operand;

use super::{CheckCtx, Checker};

/// Bounds check for stores and loads through `getelementptr` addresses.
/// The safe-access predicate is discharged by asking whether its negation
/// is satisfiable under the path constraint; Unknown stays silent.
pub struct BufferOverflowChecker;

impl Checker for BufferOverflowChecker {
  fn name(&self) -> &'static str {
    "BufferOverflow"
  }

  fn check(&self, cx: &mut CheckCtx, state: &SymbolicState, inst: &Instruction) -> Option<Report> {
    let addr_value = match inst.opcode() {
      Opcode::Store => inst.operand(1)?,
      Opcode::Load => inst.operand(0)?,
      _ => return None,
    };

    let gep = addr_value.as_inst().filter(|i| i.opcode() == Opcode::GetElementPtr)?;
    let base_value = gep.operand(0)?;

    // the object's extent: alloca size operand, or a tracked heap object
    let base = eval_operand(cx.expr_ctx, state, base_value);
    let size = if let Some(alloca) = base_value.as_inst().filter(|i| i.opcode() == Opcode::Alloca) {
      eval_operand(cx.expr_ctx, state, alloca.operand(0)?)
    } else if let Some(obj) = state.heap().object(&base) {
      obj.size.clone()
    } else {
      return None;
    };

    let ptr = eval_operand(cx.expr_ctx, state, addr_value);
    let safe = predicates::buffer_access(cx.expr_ctx, ptr.clone(), base, size.clone());

    let mut query: Vec<Expr> = state.path_constraint().constraints().to_vec();
    query.push(cx.expr_ctx.not(safe));

    match cx.solver.check(&query) {
      SolverResult::Sat => {
        let mut report = Report::new(
          VulnerabilityKind::BufferOverflow,
          Severity::High,
          inst.loc(),
          match inst.opcode() {
            Opcode::Store => "Buffer overflow detected: store operation may write beyond buffer bounds",
            _ => "Buffer overflow detected: load operation may read beyond buffer bounds",
          },
        );

        report.counterexample.insert("access".into(), format!("{ptr:?}"));
        report.counterexample.insert("buffer_size".into(), format!("{size:?}"));
        for (var, val) in cx.solver.model().int_values {
          report.counterexample.insert(var, val.to_string());
        }

        report.fix_suggestions.push("Add bounds checking before array access".into());
        report
          .fix_suggestions
          .push("Use safe library functions (e.g. strncpy instead of strcpy)".into());
        report
          .fix_suggestions
          .push("Enable compiler buffer overflow protections (-fstack-protector)".into());

        Some(report)
      }
      // Unsat proves the access in bounds; Unknown and Error stay silent
      _ => None,
    }
  }
}
