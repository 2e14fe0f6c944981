
use std::fmt::Debug;

use rustc_hash::FxHashMap;

use crate::symbol::nstring::NString;

use super::Lattice;

/// Finite map from variable names to lattice elements.
#[derive(Clone, PartialEq)]
pub struct AbstractStore<V: Lattice> {
  bindings: FxHashMap<NString, V>,
}

impl<V: Lattice> AbstractStore<V> {
  pub fn new() -> Self {
    AbstractStore { bindings: FxHashMap::default() }
  }

  pub fn bind(&mut self, var: impl Into<NString>, value: V) {
    self.bindings.insert(var.into(), value);
  }

  pub fn lookup(&self, var: impl Into<NString>) -> Option<&V> {
    self.bindings.get(&var.into())
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&NString, &V)> {
    self.bindings.iter()
  }

  /// Pointwise join. A variable bound on one side only keeps its value;
  /// differing definite values widen to ⊤.
  pub fn join(&self, other: &Self) -> Self {
    let mut result = self.clone();
    for (var, value) in &other.bindings {
      match result.bindings.get(var) {
        None => {
          result.bindings.insert(*var, value.clone());
        }
        Some(mine) if mine == value => {}
        Some(mine) => {
          let merged = if mine.is_bottom() {
            value.clone()
          } else if value.is_bottom() {
            mine.clone()
          } else {
            V::top()
          };
          result.bindings.insert(*var, merged);
        }
      }
    }
    result
  }

  /// Pointwise widening; used for loop-header in-stores.
  pub fn widen(&self, other: &Self) -> Self {
    let mut result = self.clone();
    for (var, value) in &other.bindings {
      let widened = match result.bindings.get(var) {
        Some(mine) => mine.widen(value),
        None => value.clone(),
      };
      result.bindings.insert(*var, widened);
    }
    result
  }

  /// Pointwise partial order, ⊤ at the top. A variable missing from
  /// `other` is unconstrained there only if our binding is too.
  pub fn le(&self, other: &Self) -> bool {
    self.bindings.iter().all(|(var, value)| match other.bindings.get(var) {
      Some(theirs) => value.le(theirs),
      None => value.is_bottom(),
    })
  }
}

impl<V: Lattice> Default for AbstractStore<V> {
  fn default() -> Self {
    AbstractStore::new()
  }
}

impl<V: Lattice> Debug for AbstractStore<V> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut entries: Vec<_> = self.bindings.iter().collect();
    entries.sort_by_key(|(var, _)| var.as_str());
    write!(f, "{{")?;
    for (i, (var, value)) in entries.iter().enumerate() {
      if i > 0 {
        write!(f, ", ")?;
      }
      write!(f, "{var} = {value:?}")?;
    }
    write!(f, "}}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Interval;

  #[test]
  fn bind_and_lookup() {
    let mut store: AbstractStore<Interval> = AbstractStore::new();
    store.bind("x", Interval::int(0, 5));
    assert_eq!(store.lookup("x"), Some(&Interval::int(0, 5)));
    assert_eq!(store.lookup("y"), None);
    // rebinding replaces
    store.bind("x", Interval::singleton(1));
    assert_eq!(store.lookup("x"), Some(&Interval::singleton(1)));
  }

  #[test]
  fn join_keeps_one_sided_bindings() {
    let mut a: AbstractStore<Interval> = AbstractStore::new();
    a.bind("x", Interval::int(0, 1));
    let mut b: AbstractStore<Interval> = AbstractStore::new();
    b.bind("y", Interval::int(2, 3));

    let joined = a.join(&b);
    assert_eq!(joined.lookup("x"), Some(&Interval::int(0, 1)));
    assert_eq!(joined.lookup("y"), Some(&Interval::int(2, 3)));
  }

  #[test]
  fn join_widens_differing_definites() {
    let mut a: AbstractStore<Interval> = AbstractStore::new();
    a.bind("x", Interval::int(0, 1));
    let mut b: AbstractStore<Interval> = AbstractStore::new();
    b.bind("x", Interval::int(5, 6));

    let joined = a.join(&b);
    assert_eq!(joined.lookup("x"), Some(&Interval::Top));
  }

  #[test]
  fn join_identical_bindings_stay() {
    let mut a: AbstractStore<Interval> = AbstractStore::new();
    a.bind("x", Interval::int(0, 1));
    let joined = a.join(&a.clone());
    assert_eq!(joined.lookup("x"), Some(&Interval::int(0, 1)));
  }

  #[test]
  fn partial_order() {
    let empty: AbstractStore<Interval> = AbstractStore::new();
    let mut a: AbstractStore<Interval> = AbstractStore::new();
    a.bind("x", Interval::int(0, 1));
    let mut top: AbstractStore<Interval> = AbstractStore::new();
    top.bind("x", Interval::Top);

    assert!(empty.le(&a));
    assert!(a.le(&top));
    assert!(!top.le(&a));
    assert!(!a.le(&empty));
    assert!(a.le(&a));
  }

  #[test]
  fn clone_is_independent() {
    let mut a: AbstractStore<Interval> = AbstractStore::new();
    a.bind("x", Interval::int(0, 1));
    let mut b = a.clone();
    b.bind("x", Interval::Top);
    assert_eq!(a.lookup("x"), Some(&Interval::int(0, 1)));
  }

  #[test]
  fn rendering_is_sorted() {
    let mut a: AbstractStore<Interval> = AbstractStore::new();
    a.bind("x", Interval::int(0, 1));
    a.bind("a", Interval::singleton(2));
    let text = format!("{a:?}");
    assert!(text.starts_with('{'));
    assert!(text.find("a = [2, 2]").unwrap() < text.find("x = [0, 1]").unwrap());
  }
}
