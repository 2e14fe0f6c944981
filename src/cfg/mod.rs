mod cfg;
mod traversal;

pub use cfg::*;
pub use traversal::*;
