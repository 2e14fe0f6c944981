
/// Path exploration order for the symbolic engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
  Dfs,
  Bfs,
  /// Alternates between depth- and breadth-first pops.
  Hybrid,
  /// Seeded pseudo-random pops; reproducible for a fixed seed.
  Random,
}

/// Abstract domain selection for the fixpoint analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainKind {
  Interval,
  Constant,
}

/// Everything the analyses read at runtime. The external CLI maps its
/// flags onto this and hands it to the `Analyzer`.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
  pub strategy: Strategy,
  pub domain: DomainKind,
  /// Maximum blocks entered along one path.
  pub max_depth: usize,
  /// Cap on retired states; exploration stops with partial results beyond it.
  pub max_states: usize,
  /// Wall-clock budget for one function's exploration, in seconds.
  pub timeout_seconds: u64,
  /// Budget for a single solver check, in milliseconds.
  pub solver_timeout_ms: u64,
  /// Let forks with matching memory and provably disjoint constraints
  /// collapse into one state at join blocks.
  pub enable_state_merging: bool,
  pub enable_path_pruning: bool,
  /// Seed for the Random strategy.
  pub random_seed: u64,
  /// Run the fixpoint pass in addition to symbolic execution.
  pub enable_abstract_interpretation: bool,
  /// Analyze functions on worker threads, one solver each.
  pub parallel: bool,

  // per-checker toggles
  pub check_buffer_overflow: bool,
  pub check_null_dereference: bool,
  pub check_memory_leak: bool,
  pub check_integer_overflow: bool,
  pub check_use_after_free: bool,
  pub check_double_free: bool,
}

impl Default for AnalysisOptions {
  fn default() -> Self {
    AnalysisOptions {
      strategy: Strategy::Dfs,
      domain: DomainKind::Interval,
      max_depth: 100,
      max_states: 10_000,
      timeout_seconds: 300,
      solver_timeout_ms: 5_000,
      enable_state_merging: true,
      enable_path_pruning: true,
      random_seed: 0,
      enable_abstract_interpretation: true,
      parallel: false,
      check_buffer_overflow: true,
      check_null_dereference: true,
      check_memory_leak: true,
      check_integer_overflow: true,
      check_use_after_free: true,
      check_double_free: true,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_documented_limits() {
    let opts = AnalysisOptions::default();
    assert_eq!(opts.max_depth, 100);
    assert_eq!(opts.max_states, 10_000);
    assert_eq!(opts.timeout_seconds, 300);
    assert_eq!(opts.strategy, Strategy::Dfs);
    assert!(opts.enable_path_pruning);
  }
}
