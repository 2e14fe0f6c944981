
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::ir::SourceLocation;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum VulnerabilityKind {
  BufferOverflow,
  NullPointerDereference,
  MemoryLeak,
  IntegerOverflow,
  UseAfterFree,
  DoubleFree,
}

impl Debug for VulnerabilityKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::BufferOverflow => write!(f, "BufferOverflow"),
      Self::NullPointerDereference => write!(f, "NullPointerDereference"),
      Self::MemoryLeak => write!(f, "MemoryLeak"),
      Self::IntegerOverflow => write!(f, "IntegerOverflow"),
      Self::UseAfterFree => write!(f, "UseAfterFree"),
      Self::DoubleFree => write!(f, "DoubleFree"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
  Low,
  Medium,
  High,
  Critical,
}

/// One finding. Serialization to console/JSON/SARIF happens in the
/// reporting collaborator; this is the in-memory contract.
#[derive(Clone)]
pub struct Report {
  pub kind: VulnerabilityKind,
  pub severity: Severity,
  pub location: SourceLocation,
  pub message: String,
  /// Variable assignment from the solver model that witnesses the finding.
  pub counterexample: BTreeMap<String, String>,
  pub fix_suggestions: Vec<String>,
  /// Relevant source locations, e.g. allocation sites for a leak.
  pub trace: Vec<SourceLocation>,
}

impl Report {
  pub fn new(kind: VulnerabilityKind, severity: Severity, location: SourceLocation, message: impl Into<String>) -> Self {
    Report {
      kind,
      severity,
      location,
      message: message.into(),
      counterexample: BTreeMap::new(),
      fix_suggestions: Vec::new(),
      trace: Vec::new(),
    }
  }

  pub fn file(&self) -> &str {
    self.location.file.as_str()
  }

  pub fn line(&self) -> u32 {
    self.location.line
  }

  pub fn column(&self) -> u32 {
    self.location.column
  }
}

impl Debug for Report {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{:?}/{:?}] {:?}: {}", self.kind, self.severity, self.location, self.message)?;
    for (var, val) in &self.counterexample {
      write!(f, "\n  {var} = {val}")?;
    }
    for fix in &self.fix_suggestions {
      write!(f, "\n  fix: {fix}")?;
    }
    Ok(())
  }
}
