
use std::fmt::Debug;

use rustc_hash::FxHashMap;

use crate::expr::Expr;
use crate::symbol::nstring::NString;

/// Finite map from variable names to symbolic expressions. Cloning
/// duplicates the map entry-wise; the expression trees themselves are
/// immutable and shared through the owning context.
#[derive(Clone, Default, PartialEq)]
pub struct SymbolicStore {
  bindings: FxHashMap<NString, Expr>,
}

impl SymbolicStore {
  pub fn new() -> Self {
    SymbolicStore { bindings: FxHashMap::default() }
  }

  pub fn bind(&mut self, var: impl Into<NString>, expr: Expr) {
    self.bindings.insert(var.into(), expr);
  }

  pub fn lookup(&self, var: impl Into<NString>) -> Option<&Expr> {
    self.bindings.get(&var.into())
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&NString, &Expr)> {
    self.bindings.iter()
  }

  /// Keeps existing bindings, adopts ones only the other store has.
  pub fn merge(&mut self, other: &SymbolicStore) {
    for (var, expr) in &other.bindings {
      self.bindings.entry(*var).or_insert_with(|| expr.clone());
    }
  }
}

impl Debug for SymbolicStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut entries: Vec<_> = self.bindings.iter().collect();
    entries.sort_by_key(|(var, _)| var.as_str());
    writeln!(f, "{{")?;
    for (var, expr) in entries {
      writeln!(f, "  {var} = {expr:?}")?;
    }
    write!(f, "}}")
  }
}
