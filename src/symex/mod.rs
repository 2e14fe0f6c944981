mod eval;
mod exec_state;
mod symex;
mod symex_branch;
mod symex_memory;
mod symex_ops;

pub(crate) use eval::eval_operand;
pub use exec_state::{ExplorationState, SymexStats};
pub use symex::Symex;
