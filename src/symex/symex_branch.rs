
use log::{debug, warn};

use crate::cfg::Cfg;
use crate::expr::ExprBuilder;
use crate::ir::ValueRef;

use super::eval::eval_operand;
use super::exec_state::ExplorationState;
use super::symex::Symex;

impl<'a, 'ctx> Symex<'a, 'ctx> {
  /// Forks the state into each successor. For a conditional branch
  /// (`br cond, then, else`) the clones get the branch condition and its
  /// negation; an unconditional branch forks plain clones.
  pub(super) fn symex_br(&mut self, cfg: &Cfg, es: &mut ExplorationState, inst_val: &ValueRef) {
    let inst = inst_val.as_inst().unwrap();
    let succs = cfg.successors(es.node).to_vec();
    if succs.is_empty() {
      warn!("branch instruction has no successors");
      let state = std::mem::take(&mut es.state);
      self.retire(state);
      return;
    }

    let depth = es.depth + 1;
    if depth > self.config.max_depth {
      debug!("max depth {} reached, dropping path", self.config.max_depth);
      return;
    }

    let cond = inst
      .operand(0)
      .filter(|v| v.as_label().is_none())
      .map(|v| self.ctx.as_bool(eval_operand(&self.ctx, &es.state, v)));
    let mut labels = inst.operands().iter().filter_map(|v| v.as_label());
    let then_label = labels.next();
    let else_label = labels.next();

    let here = cfg.node(es.node).name();
    for succ in succs {
      let succ_name = cfg.node(succ).name();
      let mut state = es.state.clone();

      if let Some(cond) = &cond {
        if Some(succ_name) == then_label {
          state.add_constraint(cond.clone());
        } else if Some(succ_name) == else_label {
          state.add_constraint(self.ctx.not(cond.clone()));
        }
      }

      // A sibling already parked at this join whose memory matches may
      // absorb this fork, provided the solver proves the two path
      // constraints disjoint.
      if self.config.enable_state_merging {
        let parked = self.worklist.iter().position(|p| {
          p.node == succ
            && p.inst_index == 0
            && p.state.store() == state.store()
            && p.state.heap() == state.heap()
        });
        if let Some(idx) = parked {
          let parked_state = self.worklist[idx].state.clone();
          if self.constraints_disjoint(&parked_state, &state) {
            debug!("merging fork into parked state at {succ_name}");
            let merged = self.merge_states(&parked_state, &state);
            self.worklist[idx].state = merged;
            continue;
          }
        }
      }

      self.worklist.push_back(ExplorationState {
        state,
        node: succ,
        inst_index: 0,
        trace: es.trace.clone(),
        depth,
        pred: Some(here),
      });
    }
  }

  /// A return ends the path; the state is retired into the reached set.
  pub(super) fn symex_ret(&mut self, es: &mut ExplorationState) {
    self.stats.explored_paths += 1;
    let state = std::mem::take(&mut es.state);
    self.retire(state);
  }
}
