
use std::fmt::Debug;

use super::Lattice;

/// Flat constant-propagation lattice: ⊥ < every definite value < ⊤.
/// Finite height, so widening is plain join.
#[derive(Clone, Copy, PartialEq)]
pub enum ConstantVal {
  Top,
  Bottom,
  Int(i64),
  Float(f64),
}

impl ConstantVal {
  pub fn contains(&self, v: i64) -> bool {
    match self {
      ConstantVal::Top => true,
      ConstantVal::Bottom => false,
      ConstantVal::Int(i) => *i == v,
      ConstantVal::Float(_) => false,
    }
  }

  fn binop(&self, other: &Self, f: impl Fn(i64, i64) -> Option<i64>) -> Self {
    match (self, other) {
      (ConstantVal::Bottom, _) | (_, ConstantVal::Bottom) => ConstantVal::Bottom,
      (ConstantVal::Int(a), ConstantVal::Int(b)) => match f(*a, *b) {
        Some(v) => ConstantVal::Int(v),
        None => ConstantVal::Top,
      },
      _ => ConstantVal::Top,
    }
  }

  pub fn add(&self, other: &Self) -> Self {
    self.binop(other, i64::checked_add)
  }

  pub fn sub(&self, other: &Self) -> Self {
    self.binop(other, i64::checked_sub)
  }

  pub fn mul(&self, other: &Self) -> Self {
    self.binop(other, i64::checked_mul)
  }

  pub fn div(&self, other: &Self) -> Self {
    self.binop(other, |a, b| if b == 0 { None } else { a.checked_div(b) })
  }
}

impl Lattice for ConstantVal {
  fn top() -> Self {
    ConstantVal::Top
  }

  fn bottom() -> Self {
    ConstantVal::Bottom
  }

  fn is_top(&self) -> bool {
    matches!(self, ConstantVal::Top)
  }

  fn is_bottom(&self) -> bool {
    matches!(self, ConstantVal::Bottom)
  }

  fn join(&self, other: &Self) -> Self {
    match (self, other) {
      (ConstantVal::Bottom, x) | (x, ConstantVal::Bottom) => *x,
      (a, b) if a == b => *a,
      _ => ConstantVal::Top,
    }
  }

  fn widen(&self, other: &Self) -> Self {
    self.join(other)
  }

  fn le(&self, other: &Self) -> bool {
    match (self, other) {
      (ConstantVal::Bottom, _) => true,
      (_, ConstantVal::Top) => true,
      (a, b) => a == b,
    }
  }
}

impl Debug for ConstantVal {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ConstantVal::Top => write!(f, "⊤"),
      ConstantVal::Bottom => write!(f, "⊥"),
      ConstantVal::Int(i) => write!(f, "{i}"),
      ConstantVal::Float(x) => write!(f, "{x}"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lattice_laws() {
    let a = ConstantVal::Int(1);
    let b = ConstantVal::Int(2);
    assert_eq!(a.join(&a), a);
    assert_eq!(a.join(&b), ConstantVal::Top);
    assert_eq!(a.join(&b), b.join(&a));
    assert_eq!(ConstantVal::bottom().join(&a), a);
    assert_eq!(a.join(&ConstantVal::top()), ConstantVal::top());
  }

  #[test]
  fn order() {
    let a = ConstantVal::Int(1);
    assert!(ConstantVal::bottom().le(&a));
    assert!(a.le(&ConstantVal::top()));
    assert!(!a.le(&ConstantVal::Int(2)));
  }

  #[test]
  fn arithmetic_folds_constants() {
    let a = ConstantVal::Int(6);
    let b = ConstantVal::Int(3);
    assert_eq!(a.add(&b), ConstantVal::Int(9));
    assert_eq!(a.sub(&b), ConstantVal::Int(3));
    assert_eq!(a.mul(&b), ConstantVal::Int(18));
    assert_eq!(a.div(&b), ConstantVal::Int(2));
    assert_eq!(a.div(&ConstantVal::Int(0)), ConstantVal::Top);
    assert_eq!(a.add(&ConstantVal::Top), ConstantVal::Top);
  }
}
