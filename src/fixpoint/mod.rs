mod iterator;
mod transfer;

pub use iterator::FixpointIterator;
pub use transfer::{ConstantTransfer, IntervalTransfer, Transfer};
