
use std::fmt::Debug;

use crate::expr::Expr;
use crate::symbol::nstring::NString;

use super::constraint::PathConstraint;
use super::heap::SymbolicHeap;
use super::store::SymbolicStore;

/// Full per-path execution state: symbolic store, heap and accumulated
/// path constraint. States are self-contained — forking clones the whole
/// state, so lookups never chase a parent chain.
#[derive(Clone, Default)]
pub struct SymbolicState {
  store: SymbolicStore,
  heap: SymbolicHeap,
  path_constraint: PathConstraint,
}

impl SymbolicState {
  pub fn new() -> Self {
    SymbolicState::default()
  }

  pub fn store(&self) -> &SymbolicStore {
    &self.store
  }

  pub fn store_mut(&mut self) -> &mut SymbolicStore {
    &mut self.store
  }

  pub fn heap(&self) -> &SymbolicHeap {
    &self.heap
  }

  pub fn heap_mut(&mut self) -> &mut SymbolicHeap {
    &mut self.heap
  }

  pub fn path_constraint(&self) -> &PathConstraint {
    &self.path_constraint
  }

  /// Replaces the accumulated constraint wholesale; join-block merging
  /// swaps in the disjunction of two paths' constraints.
  pub fn set_path_constraint(&mut self, constraint: PathConstraint) {
    self.path_constraint = constraint;
  }

  pub fn assign(&mut self, var: impl Into<NString>, expr: Expr) {
    self.store.bind(var, expr);
  }

  pub fn lookup(&self, var: impl Into<NString>) -> Option<&Expr> {
    self.store.lookup(var)
  }

  pub fn add_constraint(&mut self, constraint: Expr) {
    self.path_constraint.add(constraint);
  }
}

impl Debug for SymbolicState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "SymbolicState {{\n  Store: {:?}\n  Heap: {:?}\n  Constraints: {:?}\n}}",
      self.store, self.heap, self.path_constraint
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::{new_ctx, ExprBuilder};
  use crate::ir::SourceLocation;

  #[test]
  fn assign_and_lookup() {
    let ctx = new_ctx();
    let mut state = SymbolicState::new();
    state.assign("x", ctx.constant_int(1));
    assert_eq!(state.lookup("x"), Some(&ctx.constant_int(1)));
    assert_eq!(state.lookup("missing"), None);
  }

  #[test]
  fn clone_is_observationally_independent() {
    let ctx = new_ctx();
    let mut original = SymbolicState::new();
    original.assign("x", ctx.constant_int(1));
    let addr = original.heap_mut().allocate(&ctx, ctx.constant_int(4), SourceLocation::invalid());
    original.add_constraint(ctx.ne(addr.clone(), ctx.constant_int(0)));

    let mut fork = original.clone();

    // mutate the fork in every component
    fork.assign("x", ctx.constant_int(2));
    fork.assign("y", ctx.constant_int(3));
    fork.heap_mut().free(&addr);
    fork.add_constraint(ctx.eq(addr.clone(), ctx.constant_int(7)));

    // the original saw none of it
    assert_eq!(original.lookup("x"), Some(&ctx.constant_int(1)));
    assert_eq!(original.lookup("y"), None);
    assert!(!original.heap().is_freed(&addr));
    assert_eq!(original.path_constraint().len(), 1);

    // and the fork kept its own view
    assert_eq!(fork.lookup("x"), Some(&ctx.constant_int(2)));
    assert!(fork.heap().is_freed(&addr));
    assert_eq!(fork.path_constraint().len(), 2);
  }

  #[test]
  fn heap_survives_cloning_with_flags_and_sites() {
    let ctx = new_ctx();
    let mut state = SymbolicState::new();
    let site = SourceLocation::new("a.c", 10, 3);
    let addr = state.heap_mut().allocate(&ctx, ctx.constant_int(16), site);
    state.heap_mut().free(&addr);

    let fork = state.clone();
    let obj = fork.heap().object(&addr).unwrap();
    assert!(obj.is_freed);
    assert_eq!(obj.alloc_site, site);
  }
}
