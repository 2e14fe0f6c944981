mod constraint;
mod heap;
mod state;
mod store;

pub use constraint::PathConstraint;
pub use heap::{FreeOutcome, HeapObject, SymbolicHeap};
pub use state::SymbolicState;
pub use store::SymbolicStore;
