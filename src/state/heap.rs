
use std::fmt::Debug;

use rustc_hash::FxHashMap;

use crate::expr::{Expr, ExprBuilder, ExprCtx};
use crate::ir::SourceLocation;
use crate::symbol::nstring::NString;

/// One tracked allocation: its symbolic address, requested size, the
/// allocation site and whether it has been released.
#[derive(Clone, PartialEq)]
pub struct HeapObject {
  pub address: Expr,
  pub size: Expr,
  pub alloc_site: SourceLocation,
  pub is_freed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeOutcome {
  Freed,
  /// The double-free signal.
  AlreadyFreed,
  /// No object matches the address.
  NotFound,
}

/// Allocation-tracking heap. Addresses are fresh symbolic variables,
/// monotonically numbered within the heap; written cells are remembered
/// keyed by the hash-consed identity of (address, offset), which gives the
/// constant-address load refinement for free.
#[derive(Clone, Default, PartialEq)]
pub struct SymbolicHeap {
  objects: Vec<HeapObject>,
  cells: FxHashMap<(usize, Option<usize>), Expr>,
  next_id: usize,
}

impl SymbolicHeap {
  pub fn new() -> Self {
    SymbolicHeap::default()
  }

  /// Records a new live object and returns its fresh symbolic address.
  pub fn allocate(&mut self, ctx: &ExprCtx, size: Expr, site: SourceLocation) -> Expr {
    let address = ctx.variable(NString::from(format!("heap_{}", self.next_id)));
    self.next_id += 1;
    self.objects.push(HeapObject { address: address.clone(), size, alloc_site: site, is_freed: false });
    address
  }

  fn object_index(&self, address: &Expr) -> Option<usize> {
    self.objects.iter().position(|obj| obj.address == *address)
  }

  pub fn object(&self, address: &Expr) -> Option<&HeapObject> {
    self.object_index(address).map(|i| &self.objects[i])
  }

  /// Marks the matching object freed. A second call on the same address
  /// answers `AlreadyFreed`; the caller turns that into a report.
  pub fn free(&mut self, address: &Expr) -> FreeOutcome {
    match self.object_index(address) {
      Some(i) if self.objects[i].is_freed => FreeOutcome::AlreadyFreed,
      Some(i) => {
        self.objects[i].is_freed = true;
        FreeOutcome::Freed
      }
      None => FreeOutcome::NotFound,
    }
  }

  pub fn is_freed(&self, address: &Expr) -> bool {
    self.object(address).is_some_and(|obj| obj.is_freed)
  }

  /// Latest value written through the same (address, offset) pair, or the
  /// undefined sentinel. No aliasing model: distinct address terms are
  /// distinct cells.
  pub fn load(&self, ctx: &ExprCtx, address: &Expr, offset: Option<&Expr>) -> Expr {
    let key = (address.id(), offset.map(|o| o.id()));
    match self.cells.get(&key) {
      Some(value) => value.clone(),
      None => ctx.variable(NString::from("undefined")),
    }
  }

  pub fn store(&mut self, address: &Expr, offset: Option<&Expr>, value: Expr) {
    let key = (address.id(), offset.map(|o| o.id()));
    self.cells.insert(key, value);
  }

  /// True unless the address is a non-zero integer constant.
  pub fn may_be_null(&self, address: &Expr) -> bool {
    match address.extract_int() {
      Some(v) => v == 0,
      None => true,
    }
  }

  /// All live objects at this instant.
  pub fn unfreed_objects(&self) -> Vec<&HeapObject> {
    self.objects.iter().filter(|obj| !obj.is_freed).collect()
  }

  pub fn objects(&self) -> &[HeapObject] {
    &self.objects
  }
}

impl Debug for SymbolicHeap {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "Heap[")?;
    for (i, obj) in self.objects.iter().enumerate() {
      writeln!(
        f,
        "  Object{i}: addr={:?}, size={:?}, freed={}",
        obj.address, obj.size, obj.is_freed
      )?;
    }
    write!(f, "]")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::new_ctx;

  #[test]
  fn allocate_gives_distinct_addresses() {
    let ctx = new_ctx();
    let mut heap = SymbolicHeap::new();
    let a = heap.allocate(&ctx, ctx.constant_int(4), SourceLocation::invalid());
    let b = heap.allocate(&ctx, ctx.constant_int(8), SourceLocation::invalid());
    assert_ne!(a, b);
    assert_eq!(heap.unfreed_objects().len(), 2);
  }

  #[test]
  fn free_then_free_again_signals_double_free() {
    let ctx = new_ctx();
    let mut heap = SymbolicHeap::new();
    let a = heap.allocate(&ctx, ctx.constant_int(4), SourceLocation::invalid());

    assert_eq!(heap.free(&a), FreeOutcome::Freed);
    assert!(heap.is_freed(&a));
    assert_eq!(heap.free(&a), FreeOutcome::AlreadyFreed);
  }

  #[test]
  fn free_of_unknown_address_is_not_found() {
    let ctx = new_ctx();
    let mut heap = SymbolicHeap::new();
    let bogus = ctx.variable(crate::symbol::nstring::NString::from("p"));
    assert_eq!(heap.free(&bogus), FreeOutcome::NotFound);
  }

  #[test]
  fn unfreed_objects_shrink_after_free() {
    let ctx = new_ctx();
    let mut heap = SymbolicHeap::new();
    let a = heap.allocate(&ctx, ctx.constant_int(4), SourceLocation::invalid());
    let _b = heap.allocate(&ctx, ctx.constant_int(8), SourceLocation::invalid());
    heap.free(&a);
    assert_eq!(heap.unfreed_objects().len(), 1);
  }

  #[test]
  fn load_returns_undefined_without_prior_store() {
    let ctx = new_ctx();
    let mut heap = SymbolicHeap::new();
    let a = heap.allocate(&ctx, ctx.constant_int(4), SourceLocation::invalid());
    let loaded = heap.load(&ctx, &a, None);
    assert_eq!(loaded.extract_var().unwrap(), "undefined");
  }

  #[test]
  fn store_then_load_round_trips_through_the_same_address() {
    let ctx = new_ctx();
    let mut heap = SymbolicHeap::new();
    let a = heap.allocate(&ctx, ctx.constant_int(4), SourceLocation::invalid());
    heap.store(&a, None, ctx.constant_int(42));
    assert_eq!(heap.load(&ctx, &a, None), ctx.constant_int(42));

    // different offsets are different cells
    let off = ctx.constant_int(1);
    assert_eq!(heap.load(&ctx, &a, Some(&off)).extract_var().unwrap(), "undefined");
  }

  #[test]
  fn may_be_null_cases() {
    let ctx = new_ctx();
    let heap = SymbolicHeap::new();
    assert!(heap.may_be_null(&ctx.constant_int(0)));
    assert!(!heap.may_be_null(&ctx.constant_int(0x1000)));
    assert!(heap.may_be_null(&ctx.variable(crate::symbol::nstring::NString::from("p"))));
  }
}
