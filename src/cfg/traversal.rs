
use std::collections::VecDeque;

use super::cfg::{Cfg, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
  PreOrder,
  PostOrder,
  ReversePostOrder,
  Bfs,
}

impl<'f> Cfg<'f> {
  pub fn traverse(&self, order: TraversalOrder) -> Vec<NodeId> {
    match order {
      TraversalOrder::PreOrder => self.preorder(),
      TraversalOrder::PostOrder => self.postorder(),
      TraversalOrder::ReversePostOrder => self.reverse_postorder(),
      TraversalOrder::Bfs => self.bfs(),
    }
  }

  pub fn preorder(&self) -> Vec<NodeId> {
    let mut visited = vec![false; self.len()];
    let mut result = Vec::with_capacity(self.len());
    let mut stack = vec![self.entry()];
    while let Some(node) = stack.pop() {
      if visited[node] {
        continue;
      }
      visited[node] = true;
      result.push(node);
      // Reverse push keeps successor order stable under the stack.
      for succ in self.successors(node).iter().rev() {
        if !visited[*succ] {
          stack.push(*succ);
        }
      }
    }
    result
  }

  pub fn postorder(&self) -> Vec<NodeId> {
    let mut visited = vec![false; self.len()];
    let mut result = Vec::with_capacity(self.len());
    let mut stack: Vec<(NodeId, usize)> = vec![(self.entry(), 0)];
    visited[self.entry()] = true;
    while let Some((node, idx)) = stack.last_mut() {
      let node = *node;
      if *idx < self.successors(node).len() {
        let succ = self.successors(node)[*idx];
        *idx += 1;
        if !visited[succ] {
          visited[succ] = true;
          stack.push((succ, 0));
        }
      } else {
        result.push(node);
        stack.pop();
      }
    }
    result
  }

  /// Common iteration order for forward data-flow problems.
  pub fn reverse_postorder(&self) -> Vec<NodeId> {
    let mut order = self.postorder();
    order.reverse();
    order
  }

  pub fn bfs(&self) -> Vec<NodeId> {
    let mut visited = vec![false; self.len()];
    let mut result = Vec::with_capacity(self.len());
    let mut queue = VecDeque::from([self.entry()]);
    visited[self.entry()] = true;
    while let Some(node) = queue.pop_front() {
      result.push(node);
      for succ in self.successors(node) {
        if !visited[*succ] {
          visited[*succ] = true;
          queue.push_back(*succ);
        }
      }
    }
    result
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ir::{BasicBlock, Function, Instruction, Opcode, SourceLocation, Value};

  fn block(name: &str, succs: &[&str], terminator: Opcode) -> BasicBlock {
    let mut bb = BasicBlock::new(name);
    bb.push(Value::inst(Instruction::new(terminator, SourceLocation::invalid())));
    for s in succs {
      bb.add_successor(*s);
    }
    bb
  }

  fn diamond() -> Function {
    let mut f = Function::new("diamond");
    f.add_block(block("entry", &["then", "else"], Opcode::Br));
    f.add_block(block("then", &["join"], Opcode::Br));
    f.add_block(block("else", &["join"], Opcode::Br));
    f.add_block(block("join", &[], Opcode::Ret));
    f
  }

  fn names(cfg: &Cfg, ids: &[NodeId]) -> Vec<&'static str> {
    ids.iter().map(|id| cfg.node(*id).name().as_str()).collect()
  }

  #[test]
  fn preorder_visits_entry_first() {
    let f = diamond();
    let cfg = Cfg::build(&f).unwrap();
    let order = cfg.preorder();
    assert_eq!(names(&cfg, &order), vec!["entry", "then", "join", "else"]);
  }

  #[test]
  fn postorder_visits_entry_last() {
    let f = diamond();
    let cfg = Cfg::build(&f).unwrap();
    let order = cfg.postorder();
    assert_eq!(order.last(), Some(&cfg.entry()));
    assert_eq!(order.len(), 4);
  }

  #[test]
  fn reverse_postorder_starts_at_entry() {
    let f = diamond();
    let cfg = Cfg::build(&f).unwrap();
    let order = cfg.reverse_postorder();
    assert_eq!(order.first(), Some(&cfg.entry()));
    // every edge u -> v with v not a back-edge target appears u before v
    let join = cfg.node_id("join").unwrap();
    assert_eq!(order.last(), Some(&join));
  }

  #[test]
  fn bfs_levels() {
    let f = diamond();
    let cfg = Cfg::build(&f).unwrap();
    let order = cfg.bfs();
    assert_eq!(names(&cfg, &order), vec!["entry", "then", "else", "join"]);
    assert_eq!(cfg.traverse(TraversalOrder::Bfs), order);
  }
}
