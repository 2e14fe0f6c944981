
use std::fmt::Debug;

use crate::symbol::nstring::NString;

use super::op::{BinOp, UnOp};

pub type NodeId = usize;
pub type TerminalId = usize;

/// Sort of a constraint term, from the solver's point of view.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sort {
  Int,
  Bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum Terminal {
  Int(i64),
  Bool(bool),
  Var(NString),
}

impl Terminal {
  pub fn sort(&self) -> Sort {
    match self {
      Terminal::Bool(_) => Sort::Bool,
      _ => Sort::Int,
    }
  }
}

impl Debug for Terminal {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Terminal::Int(i) => write!(f, "{i}"),
      Terminal::Bool(b) => write!(f, "{b}"),
      Terminal::Var(name) => write!(f, "{name}"),
    }
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum NodeKind {
  /// Terminal is the bridge connecting ast and terminals
  Terminal(TerminalId),
  Binary(BinOp, NodeId, NodeId),
  Unary(UnOp, NodeId),
}

impl NodeKind {
  pub fn is_terminal(&self) -> bool {
    matches!(self, NodeKind::Terminal(_))
  }

  pub fn is_binary(&self) -> bool {
    matches!(self, NodeKind::Binary(..))
  }

  pub fn is_unary(&self) -> bool {
    matches!(self, NodeKind::Unary(..))
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct Node {
  kind: NodeKind,
  sort: Sort,
}

impl Node {
  pub fn terminal(i: TerminalId, sort: Sort) -> Self {
    Node { kind: NodeKind::Terminal(i), sort }
  }

  pub fn binary(op: BinOp, lhs: NodeId, rhs: NodeId) -> Self {
    let sort = if op.yields_bool() { Sort::Bool } else { Sort::Int };
    Node { kind: NodeKind::Binary(op, lhs, rhs), sort }
  }

  pub fn unary(op: UnOp, operand: NodeId) -> Self {
    let sort = if matches!(op, UnOp::Not) { Sort::Bool } else { Sort::Int };
    Node { kind: NodeKind::Unary(op, operand), sort }
  }

  pub fn kind(&self) -> NodeKind {
    self.kind
  }

  pub fn sort(&self) -> Sort {
    self.sort
  }

  /// Retrieve sub-nodes from AST
  pub fn sub_nodes(&self) -> Option<Vec<NodeId>> {
    match self.kind {
      NodeKind::Binary(_, l, r) => Some(vec![l, r]),
      NodeKind::Unary(_, o) => Some(vec![o]),
      NodeKind::Terminal(_) => None,
    }
  }
}
