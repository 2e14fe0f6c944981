
use crate::ir::{Instruction, Opcode};
use crate::report::{Report, Severity, VulnerabilityKind};
use crate::state::SymbolicState;
use crate::symex::eval_operand;

use super::{CheckCtx, Checker};

/// Load or store through an address whose heap object is already freed.
/// Direct freed-flag check, no solver involved.
pub struct UseAfterFreeChecker;

impl Checker for UseAfterFreeChecker {
  fn name(&self) -> &'static str {
    "UseAfterFree"
  }

  fn check(&self, cx: &mut CheckCtx, state: &SymbolicState, inst: &Instruction) -> Option<Report> {
    let addr_value = match inst.opcode() {
      Opcode::Load => inst.operand(0)?,
      Opcode::Store => inst.operand(1)?,
      _ => return None,
    };

    let addr = eval_operand(cx.expr_ctx, state, addr_value);
    let obj = state.heap().object(&addr).filter(|obj| obj.is_freed)?;

    let mut report = Report::new(
      VulnerabilityKind::UseAfterFree,
      Severity::Critical,
      inst.loc(),
      match inst.opcode() {
        Opcode::Load => "Use after free detected: load through freed pointer",
        _ => "Use after free detected: store through freed pointer",
      },
    );
    report.trace.push(obj.alloc_site);
    report.fix_suggestions.push("Set pointers to NULL after freeing".into());
    report
      .fix_suggestions
      .push("Do not access memory after passing it to free".into());

    Some(report)
  }
}

/// Second `free` on an already-freed address. The engine applies the
/// free's effect after checkers run, so the first free is silent here.
pub struct DoubleFreeChecker;

impl Checker for DoubleFreeChecker {
  fn name(&self) -> &'static str {
    "DoubleFree"
  }

  fn check(&self, cx: &mut CheckCtx, state: &SymbolicState, inst: &Instruction) -> Option<Report> {
    if inst.opcode() != Opcode::Call {
      return None;
    }
    if !inst.operand(0)?.is_global_named("free") {
      return None;
    }

    let addr = eval_operand(cx.expr_ctx, state, inst.operand(1)?);
    let obj = state.heap().object(&addr).filter(|obj| obj.is_freed)?;

    let mut report = Report::new(
      VulnerabilityKind::DoubleFree,
      Severity::Critical,
      inst.loc(),
      "Double free detected: address is already freed",
    );
    report.trace.push(obj.alloc_site);
    report.fix_suggestions.push("Set pointers to NULL after freeing".into());
    report.fix_suggestions.push("Free each allocation exactly once".into());

    Some(report)
  }
}
