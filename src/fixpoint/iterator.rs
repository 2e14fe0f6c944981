
use std::collections::VecDeque;

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::cfg::{Cfg, NodeId};
use crate::domain::AbstractStore;
use crate::symbol::nstring::NString;

use super::transfer::Transfer;

const MAX_ITERATIONS: usize = 10_000;

/// Worklist fixpoint computation of per-block out-stores. In-stores are
/// materialized on pop as the join of predecessor out-stores; back-edge
/// targets widen instead of joining so unbounded lattices terminate.
pub struct FixpointIterator<'c, 'f, T: Transfer> {
  cfg: &'c Cfg<'f>,
  transfer: T,
  iterations: usize,
}

impl<'c, 'f, T: Transfer> FixpointIterator<'c, 'f, T> {
  pub fn new(cfg: &'c Cfg<'f>, transfer: T) -> Self {
    FixpointIterator { cfg, transfer, iterations: 0 }
  }

  pub fn iterations(&self) -> usize {
    self.iterations
  }

  /// Runs to stability and returns the out-store of every block, keyed by
  /// block name.
  pub fn compute(&mut self) -> FxHashMap<NString, AbstractStore<T::Value>> {
    let n = self.cfg.len();
    let mut in_stores: Vec<AbstractStore<T::Value>> = (0..n).map(|_| AbstractStore::new()).collect();
    let mut out_stores: Vec<AbstractStore<T::Value>> = (0..n).map(|_| AbstractStore::new()).collect();
    let loop_headers = self.cfg.loop_headers();

    let mut worklist: VecDeque<NodeId> = VecDeque::new();
    worklist.push_back(self.cfg.entry());

    while let Some(node) = worklist.pop_front() {
      self.iterations += 1;
      if self.iterations > MAX_ITERATIONS {
        warn!("fixpoint iteration exceeded {MAX_ITERATIONS}, stopping early");
        break;
      }

      // Join predecessors; the entry keeps its empty in-store.
      let joined = self
        .cfg
        .predecessors(node)
        .iter()
        .fold(AbstractStore::new(), |acc, pred| acc.join(&out_stores[*pred]));
      let new_in = if loop_headers.contains(&node) {
        in_stores[node].widen(&joined)
      } else {
        joined
      };
      in_stores[node] = new_in;

      let mut out = in_stores[node].clone();
      for inst in self.cfg.node(node).block().instructions() {
        out = self.transfer.transfer(inst, &out);
      }

      if !out.le(&out_stores[node]) {
        debug!("block {} changed, repushing successors", self.cfg.node(node).name());
        out_stores[node] = out;
        for succ in self.cfg.successors(node) {
          worklist.push_back(*succ);
        }
      }
    }

    self
      .cfg
      .node_ids()
      .map(|id| (self.cfg.node(id).name(), out_stores[id].clone()))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Interval;
  use crate::fixpoint::transfer::{result_name, IntervalTransfer};
  use crate::ir::{BasicBlock, Function, Instruction, Opcode, SourceLocation, Value, ValueRef};

  fn term(opcode: Opcode) -> ValueRef {
    Value::inst(Instruction::new(opcode, SourceLocation::invalid()))
  }

  fn add(lhs: ValueRef, rhs: ValueRef) -> ValueRef {
    let mut inst = Instruction::new(Opcode::Add, SourceLocation::invalid());
    inst.add_operand(lhs);
    inst.add_operand(rhs);
    Value::inst(inst)
  }

  #[test]
  fn straight_line_fixpoint() {
    let sum = add(Value::int(2), Value::int(40));
    let mut bb = BasicBlock::new("entry");
    bb.push(sum.clone());
    bb.push(term(Opcode::Ret));
    let mut f = Function::new("f");
    f.add_block(bb);

    let cfg = Cfg::build(&f).unwrap();
    let mut fixpoint = FixpointIterator::new(&cfg, IntervalTransfer::new());
    let results = fixpoint.compute();

    let out = &results[&NString::from("entry")];
    assert_eq!(out.lookup(result_name(&sum)), Some(&Interval::singleton(42)));
    assert!(fixpoint.iterations() >= 1);
  }

  #[test]
  fn fixpoint_is_stable() {
    let sum = add(Value::int(1), Value::int(2));
    let mut bb = BasicBlock::new("entry");
    bb.push(sum.clone());
    bb.push(term(Opcode::Ret));
    let mut f = Function::new("f");
    f.add_block(bb);

    let cfg = Cfg::build(&f).unwrap();
    let results = FixpointIterator::new(&cfg, IntervalTransfer::new()).compute();

    // re-running the transfer over the fixpoint produces nothing new
    let transfer = IntervalTransfer::new();
    let out = &results[&NString::from("entry")];
    let mut again = out.clone();
    for inst in cfg.node(cfg.entry()).block().instructions() {
      again = transfer.transfer(inst, &again);
    }
    assert!(again.le(out));
  }

  #[test]
  fn loop_terminates_within_cap() {
    // entry -> head -> body -> head, head -> exit
    let mut entry = BasicBlock::new("entry");
    entry.push(term(Opcode::Br));
    entry.add_successor("head");

    let mut head = BasicBlock::new("head");
    head.push(term(Opcode::Br));
    head.add_successor("body");
    head.add_successor("exit");

    let mut body = BasicBlock::new("body");
    body.push(add(Value::int(1), Value::int(1)));
    body.push(term(Opcode::Br));
    body.add_successor("head");

    let mut exit = BasicBlock::new("exit");
    exit.push(term(Opcode::Ret));

    let mut f = Function::new("looped");
    f.add_block(entry);
    f.add_block(head);
    f.add_block(body);
    f.add_block(exit);

    let cfg = Cfg::build(&f).unwrap();
    let mut fixpoint = FixpointIterator::new(&cfg, IntervalTransfer::new());
    let results = fixpoint.compute();

    assert!(fixpoint.iterations() < super::MAX_ITERATIONS);
    assert!(results.contains_key(&NString::from("exit")));
  }

  #[test]
  fn branch_join_meets_at_the_join_block() {
    // both arms compute different constants into their own result names;
    // the join block sees both bindings
    let left = add(Value::int(1), Value::int(1));
    let right = add(Value::int(2), Value::int(2));

    let mut entry = BasicBlock::new("entry");
    entry.push(term(Opcode::Br));
    entry.add_successor("then");
    entry.add_successor("else");

    let mut then_bb = BasicBlock::new("then");
    then_bb.push(left.clone());
    then_bb.push(term(Opcode::Br));
    then_bb.add_successor("join");

    let mut else_bb = BasicBlock::new("else");
    else_bb.push(right.clone());
    else_bb.push(term(Opcode::Br));
    else_bb.add_successor("join");

    let mut join = BasicBlock::new("join");
    join.push(term(Opcode::Ret));

    let mut f = Function::new("diamond");
    f.add_block(entry);
    f.add_block(then_bb);
    f.add_block(else_bb);
    f.add_block(join);

    let cfg = Cfg::build(&f).unwrap();
    let results = FixpointIterator::new(&cfg, IntervalTransfer::new()).compute();

    let out = &results[&NString::from("join")];
    assert_eq!(out.lookup(result_name(&left)), Some(&Interval::singleton(2)));
    assert_eq!(out.lookup(result_name(&right)), Some(&Interval::singleton(4)));
  }
}
