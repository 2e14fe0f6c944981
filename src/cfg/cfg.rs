
use std::fmt::Write as _;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Result, VerifierError};
use crate::ir::{BasicBlock, Function};
use crate::symbol::nstring::NString;

/// Handle into the CFG's node arena. All edges are handles; nodes never own
/// each other, which keeps the successor/predecessor cycle trivial.
pub type NodeId = usize;

pub struct CfgNode<'f> {
  block: &'f BasicBlock,
  successors: Vec<NodeId>,
  predecessors: Vec<NodeId>,
}

impl<'f> CfgNode<'f> {
  pub fn block(&self) -> &'f BasicBlock {
    self.block
  }

  pub fn name(&self) -> NString {
    self.block.name()
  }

  pub fn successors(&self) -> &[NodeId] {
    &self.successors
  }

  pub fn predecessors(&self) -> &[NodeId] {
    &self.predecessors
  }
}

/// Control-flow graph of one function: a flat arena of nodes keyed by block
/// name, with entry/exit markers and precomputed (post-)dominator sets.
pub struct Cfg<'f> {
  function: &'f Function,
  nodes: Vec<CfgNode<'f>>,
  node_map: FxHashMap<NString, NodeId>,
  entry: NodeId,
  exits: Vec<NodeId>,
  dominators: Vec<FxHashSet<NodeId>>,
  post_dominators: Vec<FxHashSet<NodeId>>,
}

impl<'f> Cfg<'f> {
  pub fn build(function: &'f Function) -> Result<Self> {
    if function.blocks().is_empty() {
      return Err(VerifierError::InvalidIr(format!(
        "cannot build CFG for empty function {}",
        function.name()
      )));
    }

    let mut nodes = Vec::with_capacity(function.blocks().len());
    let mut node_map = FxHashMap::default();
    for bb in function.blocks() {
      node_map.insert(bb.name(), nodes.len());
      nodes.push(CfgNode { block: bb, successors: Vec::new(), predecessors: Vec::new() });
    }

    // Wire edges from each block's explicit successor list.
    for (id, bb) in function.blocks().iter().enumerate() {
      for succ_name in bb.successors() {
        let succ = *node_map.get(succ_name).ok_or_else(|| {
          VerifierError::InvalidIr(format!(
            "block {} names unknown successor {succ_name}",
            bb.name()
          ))
        })?;
        nodes[id].successors.push(succ);
        nodes[succ].predecessors.push(id);
      }
    }

    let entry_name = function
      .entry()
      .ok_or_else(|| VerifierError::InvalidIr(format!("function {} has no entry", function.name())))?;
    let entry = *node_map
      .get(&entry_name)
      .ok_or_else(|| VerifierError::InvalidIr(format!("entry block {entry_name} is not a member")))?;

    let exits = nodes
      .iter()
      .enumerate()
      .filter(|(_, n)| n.successors.is_empty())
      .map(|(id, _)| id)
      .collect();

    let mut cfg = Cfg {
      function,
      nodes,
      node_map,
      entry,
      exits,
      dominators: Vec::new(),
      post_dominators: Vec::new(),
    };
    cfg.dominators = cfg.compute_dominators();
    cfg.post_dominators = cfg.compute_post_dominators();
    Ok(cfg)
  }

  pub fn function(&self) -> &'f Function {
    self.function
  }

  pub fn entry(&self) -> NodeId {
    self.entry
  }

  pub fn exits(&self) -> &[NodeId] {
    &self.exits
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn node(&self, id: NodeId) -> &CfgNode<'f> {
    &self.nodes[id]
  }

  pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
    0..self.nodes.len()
  }

  pub fn node_id(&self, name: impl Into<NString>) -> Result<NodeId> {
    let name = name.into();
    self.node_map.get(&name).copied().ok_or(VerifierError::NotFound(name))
  }

  pub fn successors(&self, id: NodeId) -> &[NodeId] {
    &self.nodes[id].successors
  }

  pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
    &self.nodes[id].predecessors
  }

  fn check_node(&self, id: NodeId) -> Result<()> {
    if id < self.nodes.len() {
      Ok(())
    } else {
      Err(VerifierError::NotFound(NString::from(format!("cfg node #{id}"))))
    }
  }

  /// Iterative data-flow dominator computation: entry's set is {entry},
  /// every other starts at all nodes, then each set shrinks to
  /// {itself} ∪ (∩ predecessors) until stable.
  fn compute_dominators(&self) -> Vec<FxHashSet<NodeId>> {
    let all: FxHashSet<NodeId> = self.node_ids().collect();
    let mut dom: Vec<FxHashSet<NodeId>> = self
      .node_ids()
      .map(|id| {
        if id == self.entry {
          std::iter::once(id).collect()
        } else {
          all.clone()
        }
      })
      .collect();

    let mut changed = true;
    while changed {
      changed = false;
      for id in self.node_ids() {
        if id == self.entry {
          continue;
        }
        let mut next = self.intersect_over(&dom, self.predecessors(id));
        next.insert(id);
        if next != dom[id] {
          dom[id] = next;
          changed = true;
        }
      }
    }

    dom
  }

  /// Dual of dominators on the reverse graph, anchored at the exit set.
  fn compute_post_dominators(&self) -> Vec<FxHashSet<NodeId>> {
    let all: FxHashSet<NodeId> = self.node_ids().collect();
    let exit_set: FxHashSet<NodeId> = self.exits.iter().copied().collect();
    let mut pdom: Vec<FxHashSet<NodeId>> = self
      .node_ids()
      .map(|id| {
        if exit_set.contains(&id) {
          std::iter::once(id).collect()
        } else {
          all.clone()
        }
      })
      .collect();

    let mut changed = true;
    while changed {
      changed = false;
      for id in self.node_ids() {
        if exit_set.contains(&id) {
          continue;
        }
        let mut next = self.intersect_over(&pdom, self.successors(id));
        next.insert(id);
        if next != pdom[id] {
          pdom[id] = next;
          changed = true;
        }
      }
    }

    pdom
  }

  fn intersect_over(&self, sets: &[FxHashSet<NodeId>], over: &[NodeId]) -> FxHashSet<NodeId> {
    let mut iter = over.iter();
    let Some(first) = iter.next() else { return FxHashSet::default() };
    let mut acc = sets[*first].clone();
    for id in iter {
      acc.retain(|n| sets[*id].contains(n));
    }
    acc
  }

  /// Does `a` dominate `b`? Reflexive.
  pub fn dominates(&self, a: NodeId, b: NodeId) -> Result<bool> {
    self.check_node(a)?;
    self.check_node(b)?;
    Ok(a == b || self.dominators[b].contains(&a))
  }

  pub fn post_dominates(&self, a: NodeId, b: NodeId) -> Result<bool> {
    self.check_node(a)?;
    self.check_node(b)?;
    Ok(a == b || self.post_dominators[b].contains(&a))
  }

  pub fn dominators_of(&self, id: NodeId) -> Result<&FxHashSet<NodeId>> {
    self.check_node(id)?;
    Ok(&self.dominators[id])
  }

  /// DF(n) = { m | n dominates a predecessor of m but not strictly m }.
  pub fn dominance_frontier(&self, id: NodeId) -> Result<Vec<NodeId>> {
    self.check_node(id)?;
    let mut frontier = Vec::new();
    for m in self.node_ids() {
      let strictly_dominated = m != id && self.dominators[m].contains(&id);
      if strictly_dominated {
        continue;
      }
      let touches = self
        .predecessors(m)
        .iter()
        .any(|p| *p == id || self.dominators[*p].contains(&id));
      if touches {
        frontier.push(m);
      }
    }
    frontier.sort_unstable();
    Ok(frontier)
  }

  /// Back edges found by DFS numbering: an edge to a node still on the
  /// DFS stack closes a loop.
  pub fn back_edges(&self) -> Vec<(NodeId, NodeId)> {
    let mut discovery = vec![usize::MAX; self.nodes.len()];
    let mut on_stack = vec![false; self.nodes.len()];
    let mut back = Vec::new();
    let mut time = 0usize;

    // (node, next successor index); explicit stack to keep deep CFGs safe.
    let mut stack: Vec<(NodeId, usize)> = vec![(self.entry, 0)];
    discovery[self.entry] = time;
    time += 1;
    on_stack[self.entry] = true;

    while let Some((node, idx)) = stack.last_mut() {
      let node = *node;
      if *idx < self.nodes[node].successors.len() {
        let succ = self.nodes[node].successors[*idx];
        *idx += 1;
        if discovery[succ] == usize::MAX {
          discovery[succ] = time;
          time += 1;
          on_stack[succ] = true;
          stack.push((succ, 0));
        } else if on_stack[succ] && discovery[succ] <= discovery[node] {
          back.push((node, succ));
        }
      } else {
        on_stack[node] = false;
        stack.pop();
      }
    }

    back
  }

  /// Natural loop of each back edge (n → h): h plus every node reaching n
  /// backwards without crossing h.
  pub fn natural_loops(&self) -> Vec<Vec<NodeId>> {
    let mut loops = Vec::new();

    for (tail, header) in self.back_edges() {
      let mut body: FxHashSet<NodeId> = FxHashSet::default();
      body.insert(header);
      let mut worklist = vec![tail];
      while let Some(n) = worklist.pop() {
        if body.insert(n) {
          worklist.extend(self.predecessors(n).iter().copied());
        }
      }
      let mut body: Vec<NodeId> = body.into_iter().collect();
      body.sort_unstable();
      loops.push(body);
    }

    loops
  }

  /// Set of headers of natural loops; fixpoint widening applies here.
  pub fn loop_headers(&self) -> FxHashSet<NodeId> {
    self.back_edges().into_iter().map(|(_, h)| h).collect()
  }

  /// BFS reachability.
  pub fn has_path(&self, from: NodeId, to: NodeId) -> bool {
    if from == to {
      return true;
    }
    let mut visited = vec![false; self.nodes.len()];
    let mut queue = std::collections::VecDeque::from([from]);
    visited[from] = true;
    while let Some(n) = queue.pop_front() {
      for succ in self.successors(n) {
        if *succ == to {
          return true;
        }
        if !visited[*succ] {
          visited[*succ] = true;
          queue.push_back(*succ);
        }
      }
    }
    false
  }

  /// BFS level from entry; None when unreachable.
  pub fn depth(&self, id: NodeId) -> Option<usize> {
    let mut depth = vec![usize::MAX; self.nodes.len()];
    let mut queue = std::collections::VecDeque::from([self.entry]);
    depth[self.entry] = 0;
    while let Some(n) = queue.pop_front() {
      for succ in self.successors(n) {
        if depth[*succ] == usize::MAX {
          depth[*succ] = depth[n] + 1;
          queue.push_back(*succ);
        }
      }
    }
    (depth[id] != usize::MAX).then(|| depth[id])
  }

  /// DOT rendering; entry in green, exits in red.
  pub fn to_dot(&self) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph cfg_{} {{", self.function.name());
    let _ = writeln!(out, "  node [shape=rectangle];");
    for id in self.node_ids() {
      let _ = writeln!(out, "  \"{}\";", self.nodes[id].name());
    }
    for id in self.node_ids() {
      for succ in self.successors(id) {
        let _ = writeln!(out, "  \"{}\" -> \"{}\";", self.nodes[id].name(), self.nodes[*succ].name());
      }
    }
    let _ = writeln!(
      out,
      "  \"{}\" [style=filled, fillcolor=lightgreen];",
      self.nodes[self.entry].name()
    );
    for exit in &self.exits {
      let _ = writeln!(out, "  \"{}\" [style=filled, fillcolor=lightcoral];", self.nodes[*exit].name());
    }
    let _ = writeln!(out, "}}");
    out
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

  /// entry -> {then, else} -> join -> exit
  fn diamond() -> Function {
    let mut f = Function::new("diamond");
    f.add_block(block("entry", &["then", "else"], Opcode::Br));
    f.add_block(block("then", &["join"], Opcode::Br));
    f.add_block(block("else", &["join"], Opcode::Br));
    f.add_block(block("join", &[], Opcode::Ret));
    f
  }

  /// entry -> head -> body -> head, head -> exit
  fn looped() -> Function {
    let mut f = Function::new("looped");
    f.add_block(block("entry", &["head"], Opcode::Br));
    f.add_block(block("head", &["body", "exit"], Opcode::Br));
    f.add_block(block("body", &["head"], Opcode::Br));
    f.add_block(block("exit", &[], Opcode::Ret));
    f
  }

  #[test]
  fn empty_function_is_invalid_ir() {
    let f = Function::new("empty");
    assert!(matches!(Cfg::build(&f), Err(VerifierError::InvalidIr(_))));
  }

  #[test]
  fn entry_and_exit_identification() {
    let f = diamond();
    let cfg = Cfg::build(&f).unwrap();
    assert_eq!(cfg.node(cfg.entry()).name(), "entry");
    assert!(cfg.predecessors(cfg.entry()).is_empty());
    assert_eq!(cfg.exits().len(), 1);
    let exit = cfg.exits()[0];
    assert_eq!(cfg.node(exit).name(), "join");
    assert!(cfg.successors(exit).is_empty());
  }

  #[test]
  fn dominators_of_diamond() {
    let f = diamond();
    let cfg = Cfg::build(&f).unwrap();
    let entry = cfg.node_id("entry").unwrap();
    let then = cfg.node_id("then").unwrap();
    let join = cfg.node_id("join").unwrap();

    // entry dominates everything, a node dominates itself, branches do
    // not dominate the join.
    for id in cfg.node_ids() {
      assert!(cfg.dominates(entry, id).unwrap());
      assert!(cfg.dominates(id, id).unwrap());
    }
    assert!(!cfg.dominates(then, join).unwrap());
    assert!(cfg.post_dominates(join, entry).unwrap());
  }

  #[test]
  fn dominance_frontier_of_branch_arm() {
    let f = diamond();
    let cfg = Cfg::build(&f).unwrap();
    let then = cfg.node_id("then").unwrap();
    let join = cfg.node_id("join").unwrap();
    assert_eq!(cfg.dominance_frontier(then).unwrap(), vec![join]);
  }

  #[test]
  fn unknown_node_queries_are_not_found() {
    let f = diamond();
    let cfg = Cfg::build(&f).unwrap();
    assert!(matches!(cfg.node_id("nope"), Err(VerifierError::NotFound(_))));
    assert!(matches!(cfg.dominates(0, 99), Err(VerifierError::NotFound(_))));
  }

  #[test]
  fn loop_back_edge_and_natural_loop() {
    let f = looped();
    let cfg = Cfg::build(&f).unwrap();
    let head = cfg.node_id("head").unwrap();
    let body = cfg.node_id("body").unwrap();

    let back = cfg.back_edges();
    assert_eq!(back, vec![(body, head)]);

    let loops = cfg.natural_loops();
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0], {
      let mut v = vec![head, body];
      v.sort_unstable();
      v
    });
    assert!(cfg.loop_headers().contains(&head));
  }

  #[test]
  fn diamond_has_no_back_edges() {
    let f = diamond();
    let cfg = Cfg::build(&f).unwrap();
    assert!(cfg.back_edges().is_empty());
  }

  #[test]
  fn path_and_depth() {
    let f = looped();
    let cfg = Cfg::build(&f).unwrap();
    let entry = cfg.node_id("entry").unwrap();
    let body = cfg.node_id("body").unwrap();
    let exit = cfg.node_id("exit").unwrap();

    assert!(cfg.has_path(entry, exit));
    assert!(cfg.has_path(body, exit));
    assert!(!cfg.has_path(exit, entry));
    assert_eq!(cfg.depth(entry), Some(0));
    assert_eq!(cfg.depth(body), Some(2));
  }

  #[test]
  fn dot_marks_entry_and_exit() {
    let f = diamond();
    let cfg = Cfg::build(&f).unwrap();
    let dot = cfg.to_dot();
    assert!(dot.contains("\"entry\" [style=filled, fillcolor=lightgreen]"));
    assert!(dot.contains("\"join\" [style=filled, fillcolor=lightcoral]"));
    assert!(dot.contains("\"entry\" -> \"then\""));
  }
}
