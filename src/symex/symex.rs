
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cfg::Cfg;
use crate::checkers::{CheckCtx, Checker};
use crate::config::{AnalysisOptions, Strategy};
use crate::error::Result;
use crate::expr::{ExprBuilder, ExprCtx};
use crate::ir::{Function, Opcode, ValueRef};
use crate::report::Report;
use crate::solvers::{Solver, SolverResult};
use crate::state::{PathConstraint, SymbolicState};
use crate::symbol::nstring::NString;

use super::exec_state::{ExplorationState, SymexStats};

/// Outcome of executing one instruction within a block.
pub(super) enum Flow {
  Continue,
  /// Control left the block (branch fork or return); drop the state.
  End,
}

/// The symbolic execution engine: a strategy-driven worklist over
/// exploration states, instruction semantics that evolve the symbolic
/// state, and checker invocation on every instruction.
pub struct Symex<'a, 'ctx> {
  pub(super) config: &'a AnalysisOptions,
  pub(super) ctx: ExprCtx,
  pub(super) solver: Solver<'ctx>,
  checkers: Vec<Box<dyn Checker>>,
  pub(super) worklist: VecDeque<ExplorationState>,
  reached_states: Vec<SymbolicState>,
  reports: Vec<Report>,
  pub(super) stats: SymexStats,
  var_counter: usize,
  hybrid_back: bool,
  rng: ChaCha8Rng,
  stop: Arc<AtomicBool>,
  start: Instant,
}

impl<'a, 'ctx> Symex<'a, 'ctx> {
  pub fn new(
    config: &'a AnalysisOptions,
    ctx: ExprCtx,
    mut solver: Solver<'ctx>,
    checkers: Vec<Box<dyn Checker>>,
  ) -> Self {
    solver.set_timeout(config.solver_timeout_ms);
    Symex {
      config,
      ctx,
      solver,
      checkers,
      worklist: VecDeque::new(),
      reached_states: Vec::new(),
      reports: Vec::new(),
      stats: SymexStats::default(),
      var_counter: 0,
      hybrid_back: true,
      rng: ChaCha8Rng::seed_from_u64(config.random_seed),
      stop: Arc::new(AtomicBool::new(false)),
      start: Instant::now(),
    }
  }

  /// Flag checked between worklist iterations; exploration returns with
  /// partial results once set. The handle can cross threads.
  pub fn stop_handle(&self) -> Arc<AtomicBool> {
    self.stop.clone()
  }

  pub fn stop(&self) {
    self.stop.store(true, Ordering::Relaxed);
  }

  pub fn reports(&self) -> &[Report] {
    &self.reports
  }

  pub fn take_reports(&mut self) -> Vec<Report> {
    std::mem::take(&mut self.reports)
  }

  pub fn reached_states(&self) -> &[SymbolicState] {
    &self.reached_states
  }

  pub fn stats(&self) -> &SymexStats {
    &self.stats
  }

  pub(super) fn fresh_var_name(&mut self) -> NString {
    let name = NString::from(format!("sym_{}", self.var_counter));
    self.var_counter += 1;
    name
  }

  /// Explores every path of one function, within the configured budgets.
  pub fn run_on_function(&mut self, function: &Function) -> Result<()> {
    info!("starting symbolic execution for function {}", function.name());
    let cfg = Cfg::build(function)?;

    self.start = Instant::now();
    self.worklist.clear();
    let initial = SymbolicState::new();
    self.worklist.push_back(ExplorationState::new(initial, cfg.entry()));

    self.explore(&cfg);

    self.stats.elapsed = self.start.elapsed();
    self.stats.reached_states = self.reached_states.len();
    self.stats.found_vulnerabilities = self.reports.len();
    info!(
      "symbolic execution of {} done: {} paths, {} reports",
      function.name(),
      self.stats.explored_paths,
      self.reports.len()
    );
    Ok(())
  }

  fn explore(&mut self, cfg: &Cfg) {
    while let Some(es) = self.pop_next() {
      if self.stop.load(Ordering::Relaxed) {
        debug!("stop requested, returning partial results");
        break;
      }

      if self.start.elapsed().as_secs() >= self.config.timeout_seconds {
        warn!("symbolic execution timeout");
        self.stats.timed_out = true;
        break;
      }

      if self.reached_states.len() >= self.config.max_states {
        warn!("maximum number of states reached");
        self.stats.state_limit_hit = true;
        break;
      }

      if self.config.enable_path_pruning && !es.state.path_constraint().is_satisfiable(&mut self.solver) {
        debug!("path pruned as unsatisfiable");
        continue;
      }

      self.execute_block(cfg, es);
    }
  }

  /// Pop discipline per strategy: LIFO for DFS, FIFO for BFS, alternating
  /// for Hybrid, seeded-random otherwise.
  fn pop_next(&mut self) -> Option<ExplorationState> {
    match self.config.strategy {
      Strategy::Dfs => self.worklist.pop_back(),
      Strategy::Bfs => self.worklist.pop_front(),
      Strategy::Hybrid => {
        self.hybrid_back = !self.hybrid_back;
        if self.hybrid_back {
          self.worklist.pop_back()
        } else {
          self.worklist.pop_front()
        }
      }
      Strategy::Random => {
        if self.worklist.is_empty() {
          None
        } else {
          let idx = self.rng.gen_range(0..self.worklist.len());
          self.worklist.remove(idx)
        }
      }
    }
  }

  fn execute_block(&mut self, cfg: &Cfg, mut es: ExplorationState) {
    let block = cfg.node(es.node).block();

    for i in es.inst_index..block.len() {
      let inst_val: ValueRef = block.instructions()[i].clone();
      let inst = inst_val.as_inst().unwrap();

      if inst.loc().is_valid() {
        es.trace.push(inst.loc());
      }

      // Checks observe the state before the instruction's effects.
      self.run_checkers(&es.state, &inst_val, &es.trace);

      match self.execute_instruction(cfg, &mut es, &inst_val) {
        Flow::Continue => {}
        Flow::End => return,
      }
    }

    // A block without a terminator ends the path.
    debug!("block {} fell off without terminator", block.name());
    self.retire(es.state);
  }

  fn execute_instruction(&mut self, cfg: &Cfg, es: &mut ExplorationState, inst_val: &ValueRef) -> Flow {
    let inst = inst_val.as_inst().unwrap();
    match inst.opcode() {
      Opcode::Add
      | Opcode::Sub
      | Opcode::Mul
      | Opcode::Div
      | Opcode::Rem
      | Opcode::And
      | Opcode::Or
      | Opcode::Xor
      | Opcode::Shl
      | Opcode::Shr => {
        self.symex_arith(es, inst_val);
        Flow::Continue
      }
      Opcode::ICmp | Opcode::FCmp => {
        self.symex_cmp(es, inst_val);
        Flow::Continue
      }
      Opcode::Alloca => {
        self.symex_alloca(es, inst_val);
        Flow::Continue
      }
      Opcode::Load => {
        self.symex_load(es, inst_val);
        Flow::Continue
      }
      Opcode::Store => {
        self.symex_store(es, inst_val);
        Flow::Continue
      }
      Opcode::GetElementPtr => {
        self.symex_gep(es, inst_val);
        Flow::Continue
      }
      Opcode::Call => {
        self.symex_call(es, inst_val);
        Flow::Continue
      }
      Opcode::Phi => {
        self.symex_phi(es, inst_val);
        Flow::Continue
      }
      Opcode::Select => {
        self.symex_select(es, inst_val);
        Flow::Continue
      }
      Opcode::Assert => {
        self.symex_assert(es, inst_val);
        Flow::Continue
      }
      Opcode::Br => {
        self.symex_br(cfg, es, inst_val);
        Flow::End
      }
      Opcode::Ret => {
        self.symex_ret(es);
        Flow::End
      }
    }
  }

  fn run_checkers(&mut self, state: &SymbolicState, inst_val: &ValueRef, trace: &[crate::ir::SourceLocation]) {
    let inst = inst_val.as_inst().unwrap();
    for checker in &self.checkers {
      let mut cx = CheckCtx { expr_ctx: &self.ctx, solver: &mut self.solver };
      if let Some(mut report) = checker.check(&mut cx, state, inst) {
        debug!("{} fired at {:?}", checker.name(), inst.loc());
        // checkers that know better (allocation sites) keep their trace
        if report.trace.is_empty() {
          report.trace = trace.to_vec();
        }
        self.reports.push(report);
      }
    }
  }

  pub(super) fn retire(&mut self, state: SymbolicState) {
    self.reached_states.push(state);
  }

  /// True when the two paths cannot both be feasible. Only a definite
  /// Unsat counts, so the stub backend never lets a merge collapse paths.
  pub(super) fn constraints_disjoint(&mut self, first: &SymbolicState, second: &SymbolicState) -> bool {
    let c1 = first.path_constraint().conjunction(&self.ctx);
    let c2 = second.path_constraint().conjunction(&self.ctx);
    let both = self.ctx.and(c1, c2);
    self.solver.check_expr(&both) == SolverResult::Unsat
  }

  /// Merges two states meeting at a join block. With provably disjoint
  /// path constraints the merged state keeps the first state's memory and
  /// takes the disjunction of the constraints; otherwise the merge
  /// degrades to a clone of the first state.
  pub fn merge_states(&mut self, first: &SymbolicState, second: &SymbolicState) -> SymbolicState {
    if !self.constraints_disjoint(first, second) {
      return first.clone();
    }
    let c1 = first.path_constraint().conjunction(&self.ctx);
    let c2 = second.path_constraint().conjunction(&self.ctx);
    let mut constraint = PathConstraint::new();
    constraint.add(self.ctx.or(c1, c2));
    let mut merged = first.clone();
    merged.set_path_constraint(constraint);
    merged
  }
}
