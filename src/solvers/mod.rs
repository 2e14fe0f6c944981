pub mod smt;
pub mod solver;
pub mod stub;
#[cfg(feature = "z3")]
pub mod z3;

pub use smt::smt_conv::{Convert, Decide};
pub use solver::{Model, Solver, SolverCtx, SolverResult};
