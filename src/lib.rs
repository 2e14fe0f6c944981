//! Analysis core for detecting memory-safety and arithmetic bugs in C
//! programs: symbolic execution over a lightweight SSA-style IR combined
//! with abstract interpretation over numeric domains, both discharging
//! queries through an SMT bridge.
//!
//! A frontend lowers C source into a [`ir::Module`]; the [`Analyzer`]
//! builds per-function CFGs, runs the fixpoint and symbolic engines, and
//! returns typed [`report::Report`]s. Enable the `z3` feature to back the
//! solver bridge with a real decision procedure; without it the bridge
//! answers Sat conservatively and precision drops, but no feasible path is
//! ever pruned.

pub mod analysis;
pub mod cfg;
pub mod checkers;
pub mod config;
pub mod domain;
pub mod error;
pub mod expr;
pub mod fixpoint;
pub mod ir;
pub mod report;
pub mod solvers;
pub mod state;
pub mod symbol;
pub mod symex;

pub use analysis::{AnalysisResult, Analyzer};
pub use config::{AnalysisOptions, DomainKind, Strategy};
pub use error::{Result, VerifierError};
pub use report::{Report, Severity, VulnerabilityKind};
pub use symbol::nstring::NString;
