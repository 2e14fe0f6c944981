mod buffer;
mod free;
mod leak;
mod null;
mod overflow;

pub use buffer::BufferOverflowChecker;
pub use free::{DoubleFreeChecker, UseAfterFreeChecker};
pub use leak::MemoryLeakChecker;
pub use null::NullPointerChecker;
pub use overflow::IntegerOverflowChecker;

use crate::config::AnalysisOptions;
use crate::expr::ExprCtx;
use crate::ir::Instruction;
use crate::report::Report;
use crate::solvers::Solver;
use crate::state::SymbolicState;

/// What a checker may use while deciding: the expression context for
/// formulating predicates and the analysis' solver for discharging them.
pub struct CheckCtx<'a, 'ctx> {
  pub expr_ctx: &'a ExprCtx,
  pub solver: &'a mut Solver<'ctx>,
}

/// A safety query issued at relevant instructions. Checkers are
/// registered as a list of these capabilities; the engine iterates them
/// on every instruction, before the instruction's effects apply. A
/// checker that cannot decide produces no report.
pub trait Checker {
  fn name(&self) -> &'static str;

  fn check(&self, cx: &mut CheckCtx, state: &SymbolicState, inst: &Instruction) -> Option<Report>;
}

/// Checker list for the enabled toggles.
pub fn default_checkers(options: &AnalysisOptions) -> Vec<Box<dyn Checker>> {
  let mut checkers: Vec<Box<dyn Checker>> = Vec::new();
  if options.check_buffer_overflow {
    checkers.push(Box::new(BufferOverflowChecker));
  }
  if options.check_null_dereference {
    checkers.push(Box::new(NullPointerChecker));
  }
  if options.check_memory_leak {
    checkers.push(Box::new(MemoryLeakChecker));
  }
  if options.check_integer_overflow {
    checkers.push(Box::new(IntegerOverflowChecker));
  }
  if options.check_use_after_free {
    checkers.push(Box::new(UseAfterFreeChecker));
  }
  if options.check_double_free {
    checkers.push(Box::new(DoubleFreeChecker));
  }
  checkers
}
