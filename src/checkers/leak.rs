
use crate::ir::{Instruction, Opcode};
use crate::report::{Report, Severity, VulnerabilityKind};
use crate::state::SymbolicState;

use super::{CheckCtx, Checker};

/// At each function return, every still-live heap object is a leak on
/// that path. Direct heap walk, no solver involved.
pub struct MemoryLeakChecker;

impl Checker for MemoryLeakChecker {
  fn name(&self) -> &'static str {
    "MemoryLeak"
  }

  fn check(&self, _cx: &mut CheckCtx, state: &SymbolicState, inst: &Instruction) -> Option<Report> {
    if inst.opcode() != Opcode::Ret {
      return None;
    }

    let unfreed = state.heap().unfreed_objects();
    if unfreed.is_empty() {
      return None;
    }

    let mut report = Report::new(
      VulnerabilityKind::MemoryLeak,
      Severity::Medium,
      inst.loc(),
      format!("Memory leak detected: {} allocated object(s) not freed", unfreed.len()),
    );

    for obj in unfreed.iter().take(5) {
      report.trace.push(obj.alloc_site);
    }

    report
      .fix_suggestions
      .push("Ensure all allocated memory is freed before exit".into());
    report.fix_suggestions.push("Free each allocation on every return path".into());
    report
      .fix_suggestions
      .push("Use memory analysis tools (e.g. Valgrind, AddressSanitizer)".into());

    Some(report)
  }
}
