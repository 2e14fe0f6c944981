
use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::symbol::nstring::NString;

use super::ast::*;
use super::expr::Expr;
use super::op::{BinOp, UnOp};

/// Context manages expression nodes. Structurally equal terms are
/// hash-consed onto the same node id, so id equality is structural
/// equality and side tables can key on ids.
pub struct Context {
  nodes: Vec<Node>,
  node_map: FxHashMap<Node, NodeId>,
  terminals: Vec<Terminal>,
  terminal_map: FxHashMap<Terminal, TerminalId>,
}

impl Context {
  pub const TRUE_ID: NodeId = 0;
  pub const FALSE_ID: NodeId = 1;

  pub fn new() -> Self {
    let mut ctx = Context {
      nodes: Vec::new(),
      node_map: FxHashMap::default(),
      terminals: Vec::new(),
      terminal_map: FxHashMap::default(),
    };
    ctx.init_terminals();
    ctx
  }

  fn init_terminals(&mut self) {
    let t = self.add_terminal(Terminal::Bool(true));
    self.add_node(Node::terminal(t, Sort::Bool));
    let f = self.add_terminal(Terminal::Bool(false));
    self.add_node(Node::terminal(f, Sort::Bool));
  }

  pub(super) fn add_node(&mut self, node: Node) -> NodeId {
    match self.node_map.get(&node) {
      Some(id) => *id,
      None => {
        self.nodes.push(node);
        let id = self.nodes.len() - 1;
        self.node_map.insert(node, id);
        id
      }
    }
  }

  fn add_terminal(&mut self, terminal: Terminal) -> TerminalId {
    match self.terminal_map.get(&terminal) {
      Some(id) => *id,
      None => {
        self.terminals.push(terminal);
        let id = self.terminals.len() - 1;
        self.terminal_map.insert(terminal, id);
        id
      }
    }
  }

  pub(super) fn node(&self, i: NodeId) -> Node {
    assert!(i < self.nodes.len());
    self.nodes[i]
  }

  pub fn sort(&self, i: NodeId) -> Sort {
    self.node(i).sort()
  }

  pub fn is_terminal(&self, i: NodeId) -> bool {
    self.node(i).kind().is_terminal()
  }

  pub fn is_binary(&self, i: NodeId) -> bool {
    self.node(i).kind().is_binary()
  }

  pub fn is_unary(&self, i: NodeId) -> bool {
    self.node(i).kind().is_unary()
  }

  pub fn is_true(&self, i: NodeId) -> bool {
    i == Context::TRUE_ID
  }

  pub fn is_false(&self, i: NodeId) -> bool {
    i == Context::FALSE_ID
  }

  pub(super) fn terminal(&self, i: NodeId) -> Option<Terminal> {
    match self.node(i).kind() {
      NodeKind::Terminal(t) => Some(self.terminals[t]),
      _ => None,
    }
  }

  pub fn is_constant(&self, i: NodeId) -> bool {
    matches!(self.terminal(i), Some(Terminal::Int(_) | Terminal::Bool(_)))
  }

  pub fn is_variable(&self, i: NodeId) -> bool {
    matches!(self.terminal(i), Some(Terminal::Var(_)))
  }

  pub fn extract_int(&self, i: NodeId) -> Option<i64> {
    match self.terminal(i) {
      Some(Terminal::Int(v)) => Some(v),
      _ => None,
    }
  }

  pub fn extract_var(&self, i: NodeId) -> Option<NString> {
    match self.terminal(i) {
      Some(Terminal::Var(name)) => Some(name),
      _ => None,
    }
  }

  pub fn extract_bin_op(&self, i: NodeId) -> Option<BinOp> {
    match self.node(i).kind() {
      NodeKind::Binary(op, ..) => Some(op),
      _ => None,
    }
  }

  pub fn extract_un_op(&self, i: NodeId) -> Option<UnOp> {
    match self.node(i).kind() {
      NodeKind::Unary(op, _) => Some(op),
      _ => None,
    }
  }

  pub fn sub_nodes(&self, i: NodeId) -> Option<Vec<NodeId>> {
    self.node(i).sub_nodes()
  }

  fn mk_terminal(&mut self, terminal: Terminal) -> NodeId {
    let sort = terminal.sort();
    let t = self.add_terminal(terminal);
    self.add_node(Node::terminal(t, sort))
  }
}

impl Default for Context {
  fn default() -> Self {
    Context::new()
  }
}

pub type ExprCtx = Rc<RefCell<Context>>;

pub fn new_ctx() -> ExprCtx {
  Rc::new(RefCell::new(Context::new()))
}

/// Constructors for the constraint language. Implemented on `ExprCtx` so
/// call sites read `ctx.add(a, b)` the way the engine builds terms.
pub trait ExprBuilder {
  fn constant_bool(&self, b: bool) -> Expr;
  fn _true(&self) -> Expr;
  fn _false(&self) -> Expr;
  fn constant_int(&self, i: i64) -> Expr;
  fn variable(&self, name: NString) -> Expr;

  fn binary(&self, op: BinOp, lhs: Expr, rhs: Expr) -> Expr;
  fn unary(&self, op: UnOp, operand: Expr) -> Expr;

  fn add(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn sub(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn mul(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn div(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn rem(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn bitand(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn bitor(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn bitxor(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn shl(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn shr(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn eq(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn ne(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn lt(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn le(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn gt(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn ge(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn and(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn or(&self, lhs: Expr, rhs: Expr) -> Expr;
  fn implies(&self, cond: Expr, conseq: Expr) -> Expr;
  fn not(&self, operand: Expr) -> Expr;
  fn neg(&self, operand: Expr) -> Expr;
  fn bitnot(&self, operand: Expr) -> Expr;

  /// Coerces an integer-sorted term into a proposition (`x != 0`).
  fn as_bool(&self, operand: Expr) -> Expr;
}

impl ExprBuilder for ExprCtx {
  fn constant_bool(&self, b: bool) -> Expr {
    Expr::new(self.clone(), if b { Context::TRUE_ID } else { Context::FALSE_ID })
  }

  fn _true(&self) -> Expr {
    self.constant_bool(true)
  }

  fn _false(&self) -> Expr {
    self.constant_bool(false)
  }

  fn constant_int(&self, i: i64) -> Expr {
    let id = self.borrow_mut().mk_terminal(Terminal::Int(i));
    Expr::new(self.clone(), id)
  }

  fn variable(&self, name: NString) -> Expr {
    let id = self.borrow_mut().mk_terminal(Terminal::Var(name));
    Expr::new(self.clone(), id)
  }

  fn binary(&self, op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    let id = self.borrow_mut().add_node(Node::binary(op, lhs.id(), rhs.id()));
    Expr::new(self.clone(), id)
  }

  fn unary(&self, op: UnOp, operand: Expr) -> Expr {
    let id = self.borrow_mut().add_node(Node::unary(op, operand.id()));
    Expr::new(self.clone(), id)
  }

  fn add(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Add, lhs, rhs)
  }

  fn sub(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Sub, lhs, rhs)
  }

  fn mul(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Mul, lhs, rhs)
  }

  fn div(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Div, lhs, rhs)
  }

  fn rem(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Rem, lhs, rhs)
  }

  fn bitand(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::BitAnd, lhs, rhs)
  }

  fn bitor(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::BitOr, lhs, rhs)
  }

  fn bitxor(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::BitXor, lhs, rhs)
  }

  fn shl(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Shl, lhs, rhs)
  }

  fn shr(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Shr, lhs, rhs)
  }

  fn eq(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Eq, lhs, rhs)
  }

  fn ne(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Ne, lhs, rhs)
  }

  fn lt(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Lt, lhs, rhs)
  }

  fn le(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Le, lhs, rhs)
  }

  fn gt(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Gt, lhs, rhs)
  }

  fn ge(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Ge, lhs, rhs)
  }

  fn and(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::And, lhs, rhs)
  }

  fn or(&self, lhs: Expr, rhs: Expr) -> Expr {
    self.binary(BinOp::Or, lhs, rhs)
  }

  fn implies(&self, cond: Expr, conseq: Expr) -> Expr {
    self.binary(BinOp::Implies, cond, conseq)
  }

  fn not(&self, operand: Expr) -> Expr {
    self.unary(UnOp::Not, operand)
  }

  fn neg(&self, operand: Expr) -> Expr {
    self.unary(UnOp::Neg, operand)
  }

  fn bitnot(&self, operand: Expr) -> Expr {
    self.unary(UnOp::BitNot, operand)
  }

  fn as_bool(&self, operand: Expr) -> Expr {
    if operand.sort() == Sort::Bool {
      operand
    } else {
      let zero = self.constant_int(0);
      self.ne(operand, zero)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_consing_reuses_ids() {
    let ctx = new_ctx();
    let x = ctx.variable(NString::from("x"));
    let one = ctx.constant_int(1);
    let a = ctx.add(x.clone(), one.clone());
    let b = ctx.add(x, one);
    assert_eq!(a, b);
    assert_eq!(a.id(), b.id());
  }

  #[test]
  fn true_false_are_preinterned() {
    let ctx = new_ctx();
    assert!(ctx._true().is_true());
    assert!(ctx._false().is_false());
    assert_ne!(ctx._true(), ctx._false());
  }

  #[test]
  fn sorts_follow_operators() {
    let ctx = new_ctx();
    let x = ctx.variable(NString::from("x"));
    let y = ctx.variable(NString::from("y"));
    assert_eq!(ctx.add(x.clone(), y.clone()).sort(), Sort::Int);
    assert_eq!(ctx.lt(x.clone(), y.clone()).sort(), Sort::Bool);
    assert_eq!(ctx.as_bool(x.clone()).sort(), Sort::Bool);
    // already-boolean terms pass through unchanged
    let cmp = ctx.lt(x, y);
    assert_eq!(ctx.as_bool(cmp.clone()), cmp);
  }
}
