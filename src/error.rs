
use thiserror::Error;

use crate::symbol::nstring::NString;

/// Failure kinds surfaced by the analysis pipeline.
///
/// `InvalidIr` is fatal to the pipeline. `Translation` is fatal to the
/// current SMT check only; callers treat it as an Unknown answer. `Solver`
/// failures degrade to Unknown and the analysis continues. `Timeout` and
/// `ResourceLimit` terminate exploration with partial results. `NotFound`
/// yields an empty result with a warning.
#[derive(Debug, Error)]
pub enum VerifierError {
  #[error("invalid IR: {0}")]
  InvalidIr(String),

  #[error("constraint translation failed: {0}")]
  Translation(String),

  #[error("solver failure: {0}")]
  Solver(String),

  #[error("analysis timed out")]
  Timeout,

  #[error("state limit reached")]
  ResourceLimit,

  #[error("not found: {0}")]
  NotFound(NString),
}

pub type Result<T> = std::result::Result<T, VerifierError>;
