
use std::fmt::Debug;
use std::time::Duration;

use crate::cfg::NodeId;
use crate::ir::SourceLocation;
use crate::state::SymbolicState;
use crate::symbol::nstring::NString;

/// Worklist item: a symbolic state positioned at an instruction within a
/// CFG node, plus the trace that led here.
pub struct ExplorationState {
  pub state: SymbolicState,
  pub node: NodeId,
  pub inst_index: usize,
  pub trace: Vec<SourceLocation>,
  /// Blocks entered along this path; bounded by `max_depth`.
  pub depth: usize,
  /// Block we arrived from; phi nodes select by it.
  pub pred: Option<NString>,
}

impl ExplorationState {
  pub fn new(state: SymbolicState, node: NodeId) -> Self {
    ExplorationState { state, node, inst_index: 0, trace: Vec::new(), depth: 0, pred: None }
  }
}

/// Counters reported after a run; partial results are flagged here.
#[derive(Default, Clone)]
pub struct SymexStats {
  pub explored_paths: usize,
  pub reached_states: usize,
  pub found_vulnerabilities: usize,
  pub timed_out: bool,
  pub state_limit_hit: bool,
  pub elapsed: Duration,
}

impl Debug for SymexStats {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "Symbolic Execution Statistics:")?;
    writeln!(f, "  Explored Paths: {}", self.explored_paths)?;
    writeln!(f, "  Reached States: {}", self.reached_states)?;
    writeln!(f, "  Found Vulnerabilities: {}", self.found_vulnerabilities)?;
    if self.timed_out {
      writeln!(f, "  (stopped: timeout)")?;
    }
    if self.state_limit_hit {
      writeln!(f, "  (stopped: state limit)")?;
    }
    write!(f, "  Elapsed Time: {:.3}s", self.elapsed.as_secs_f64())
  }
}
