mod constant;
mod interval;
mod store;

pub use constant::ConstantVal;
pub use interval::Interval;
pub use store::AbstractStore;

use std::fmt::Debug;

/// Lattice operations every abstract domain provides. Tagged variants with
/// exhaustive matches stand in for the virtual hierarchy of the usual
/// object-oriented rendition.
pub trait Lattice: Clone + PartialEq + Debug {
  fn top() -> Self;
  fn bottom() -> Self;
  fn is_top(&self) -> bool;
  fn is_bottom(&self) -> bool;
  /// Least upper bound.
  fn join(&self, other: &Self) -> Self;
  /// Over-approximation of join that guarantees convergence.
  fn widen(&self, other: &Self) -> Self;
  /// Partial order.
  fn le(&self, other: &Self) -> bool;
}
