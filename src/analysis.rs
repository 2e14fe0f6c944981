
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::cfg::Cfg;
use crate::checkers::default_checkers;
use crate::config::{AnalysisOptions, DomainKind};
use crate::domain::{AbstractStore, ConstantVal, Interval};
use crate::error::{Result, VerifierError};
use crate::expr::new_ctx;
use crate::fixpoint::{ConstantTransfer, FixpointIterator, IntervalTransfer};
use crate::ir::{Function, Module};
use crate::report::{Report, Severity};
use crate::solvers::{Solver, SolverCtx};
use crate::symbol::nstring::NString;
use crate::symex::{Symex, SymexStats};

/// Outcome of analyzing a module.
#[derive(Default)]
pub struct AnalysisResult {
  pub functions_analyzed: usize,
  pub paths_explored: usize,
  pub reports: Vec<Report>,
  pub analysis_time: f64,
  pub timed_out: bool,
  pub state_limit_hit: bool,
}

impl AnalysisResult {
  pub fn vulnerabilities_found(&self) -> usize {
    self.reports.len()
  }

  /// Exit-code contract for drivers: 0 clean, 1 findings at or above the
  /// threshold. (Internal errors never reach a result; they surface as
  /// `VerifierError` before one exists.)
  pub fn exit_code(&self, threshold: Severity) -> i32 {
    if self.reports.iter().any(|r| r.severity >= threshold) {
      1
    } else {
      0
    }
  }
}

/// Entry point of the analysis pipeline: validates the module, then runs
/// the abstract-interpretation pass and symbolic execution over each
/// function, collecting vulnerability reports.
pub struct Analyzer {
  module: Arc<Module>,
  options: AnalysisOptions,
}

impl Analyzer {
  /// Rejects modules that fail validation; no partial analyses run.
  pub fn new(module: Module, options: AnalysisOptions) -> Result<Self> {
    if !module.validate() {
      return Err(VerifierError::InvalidIr(format!(
        "module {} failed validation",
        module.name()
      )));
    }
    Ok(Analyzer { module: Arc::new(module), options })
  }

  pub fn module(&self) -> &Module {
    &self.module
  }

  /// Analyzes every function. With `parallel` set, functions run on
  /// worker threads, each with its own expression context and solver.
  pub fn analyze(&self) -> AnalysisResult {
    let start = Instant::now();
    let mut result = AnalysisResult::default();

    let options = &self.options;
    let outcomes: Vec<(Vec<Report>, SymexStats)> = if self.options.parallel {
      std::thread::scope(|scope| {
        let handles: Vec<_> = self
          .module
          .functions()
          .iter()
          .map(|func| scope.spawn(move || analyze_function(options, func)))
          .collect();
        handles.into_iter().map(|h| h.join().expect("analysis worker panicked")).collect()
      })
    } else {
      self.module.functions().iter().map(|func| analyze_function(&self.options, func)).collect()
    };

    for (reports, stats) in outcomes {
      result.functions_analyzed += 1;
      result.paths_explored += stats.explored_paths;
      result.timed_out |= stats.timed_out;
      result.state_limit_hit |= stats.state_limit_hit;
      result.reports.extend(reports);
    }

    result.analysis_time = start.elapsed().as_secs_f64();
    info!(
      "analyzed {} function(s): {} path(s), {} report(s) in {:.3}s",
      result.functions_analyzed,
      result.paths_explored,
      result.reports.len(),
      result.analysis_time
    );
    result
  }

  /// Analyzes one function by name. An unknown name yields an empty
  /// result with a warning.
  pub fn analyze_function(&self, name: impl Into<NString>) -> (Vec<Report>, SymexStats) {
    let name = name.into();
    match self.module.function(name) {
      Some(func) => analyze_function(&self.options, func),
      None => {
        warn!("function not found: {name}");
        (Vec::new(), SymexStats::default())
      }
    }
  }

  /// Interval fixpoint of one function: out-store per block.
  pub fn interval_fixpoint(
    &self,
    name: impl Into<NString>,
  ) -> Result<FxHashMap<NString, AbstractStore<Interval>>> {
    let name = name.into();
    let func = self.module.function(name).ok_or(VerifierError::NotFound(name))?;
    let cfg = Cfg::build(func)?;
    Ok(FixpointIterator::new(&cfg, IntervalTransfer::new()).compute())
  }

  /// Constant-domain fixpoint of one function.
  pub fn constant_fixpoint(
    &self,
    name: impl Into<NString>,
  ) -> Result<FxHashMap<NString, AbstractStore<ConstantVal>>> {
    let name = name.into();
    let func = self.module.function(name).ok_or(VerifierError::NotFound(name))?;
    let cfg = Cfg::build(func)?;
    Ok(FixpointIterator::new(&cfg, ConstantTransfer::new()).compute())
  }
}

/// One function through both analyses. Every resource here (context,
/// solver, engine) lives and dies with this call, so threads need no
/// coordination.
fn analyze_function(options: &AnalysisOptions, func: &Function) -> (Vec<Report>, SymexStats) {
  if options.enable_abstract_interpretation {
    match Cfg::build(func) {
      Ok(cfg) => match options.domain {
        DomainKind::Interval => {
          let mut fixpoint = FixpointIterator::new(&cfg, IntervalTransfer::new());
          let results = fixpoint.compute();
          debug!(
            "interval fixpoint of {}: {} block(s) in {} iteration(s)",
            func.name(),
            results.len(),
            fixpoint.iterations()
          );
        }
        DomainKind::Constant => {
          let mut fixpoint = FixpointIterator::new(&cfg, ConstantTransfer::new());
          let results = fixpoint.compute();
          debug!(
            "constant fixpoint of {}: {} block(s) in {} iteration(s)",
            func.name(),
            results.len(),
            fixpoint.iterations()
          );
        }
      },
      Err(e) => warn!("skipping abstract interpretation of {}: {e}", func.name()),
    }
  }

  let ctx = new_ctx();
  let solver_ctx = SolverCtx::new();
  let solver = Solver::new(&solver_ctx);
  let mut symex = Symex::new(options, ctx, solver, default_checkers(options));

  if let Err(e) = symex.run_on_function(func) {
    warn!("symbolic execution of {} failed: {e}", func.name());
    return (Vec::new(), SymexStats::default());
  }

  let stats = symex.stats().clone();
  (symex.take_reports(), stats)
}
