
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::symbol::nstring::NString;

use super::inst::Instruction;

/// Static category of an IR value. Separate from whatever abstract or
/// symbolic value the analyses attach at runtime.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
  Integer,
  Float,
  Pointer,
  Array,
  Struct,
  Void,
}

impl Debug for ValueType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Integer => write!(f, "i64"),
      Self::Float => write!(f, "f64"),
      Self::Pointer => write!(f, "ptr"),
      Self::Array => write!(f, "array"),
      Self::Struct => write!(f, "struct"),
      Self::Void => write!(f, "void"),
    }
  }
}

/// Source position carried by instructions and reports. A location with an
/// empty file name is invalid and is not rendered.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
  pub file: NString,
  pub line: u32,
  pub column: u32,
}

impl SourceLocation {
  pub fn new(file: impl Into<NString>, line: u32, column: u32) -> Self {
    SourceLocation { file: file.into(), line, column }
  }

  pub fn invalid() -> Self {
    SourceLocation { file: NString::from(""), line: 0, column: 0 }
  }

  pub fn is_valid(&self) -> bool {
    !self.file.is_empty()
  }
}

impl Debug for SourceLocation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if self.is_valid() {
      write!(f, "{}:{}:{}", self.file, self.line, self.column)
    } else {
      write!(f, "<unknown>")
    }
  }
}

#[derive(Clone, Copy, PartialEq)]
pub enum Constant {
  Int(i64),
  Float(f64),
  Null,
  Undef,
}

impl Debug for Constant {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Int(i) => write!(f, "{i}"),
      Self::Float(x) => write!(f, "{x}"),
      Self::Null => write!(f, "null"),
      Self::Undef => write!(f, "undef"),
    }
  }
}

pub type ValueId = u64;

static NEXT_VALUE_ID: AtomicU64 = AtomicU64::new(0);

fn fresh_value_id() -> ValueId {
  NEXT_VALUE_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug)]
pub enum ValueKind {
  Constant(Constant),
  Variable { name: NString, ty: ValueType, ssa_id: i32 },
  Argument { name: NString, ty: ValueType, index: usize },
  Global { name: NString, ty: ValueType, is_const: bool },
  /// Branch target or phi incoming-block operand.
  Label(NString),
  Inst(Instruction),
}

/// An IR value. Immutable after construction; containers reference values
/// by identity through `ValueRef`. The id is unique per process so it can
/// key side tables without comparing pointers.
pub struct Value {
  id: ValueId,
  kind: ValueKind,
}

pub type ValueRef = Arc<Value>;

impl Value {
  fn wrap(kind: ValueKind) -> ValueRef {
    Arc::new(Value { id: fresh_value_id(), kind })
  }

  pub fn int(v: i64) -> ValueRef {
    Value::wrap(ValueKind::Constant(Constant::Int(v)))
  }

  pub fn float(v: f64) -> ValueRef {
    Value::wrap(ValueKind::Constant(Constant::Float(v)))
  }

  pub fn null() -> ValueRef {
    Value::wrap(ValueKind::Constant(Constant::Null))
  }

  pub fn undef() -> ValueRef {
    Value::wrap(ValueKind::Constant(Constant::Undef))
  }

  pub fn variable(name: impl Into<NString>, ty: ValueType, ssa_id: i32) -> ValueRef {
    Value::wrap(ValueKind::Variable { name: name.into(), ty, ssa_id })
  }

  pub fn argument(name: impl Into<NString>, ty: ValueType, index: usize) -> ValueRef {
    Value::wrap(ValueKind::Argument { name: name.into(), ty, index })
  }

  pub fn global(name: impl Into<NString>, ty: ValueType, is_const: bool) -> ValueRef {
    Value::wrap(ValueKind::Global { name: name.into(), ty, is_const })
  }

  pub fn label(name: impl Into<NString>) -> ValueRef {
    Value::wrap(ValueKind::Label(name.into()))
  }

  pub fn inst(inst: Instruction) -> ValueRef {
    Value::wrap(ValueKind::Inst(inst))
  }

  pub fn id(&self) -> ValueId {
    self.id
  }

  pub fn kind(&self) -> &ValueKind {
    &self.kind
  }

  pub fn ty(&self) -> ValueType {
    match &self.kind {
      ValueKind::Constant(Constant::Int(_)) => ValueType::Integer,
      ValueKind::Constant(Constant::Float(_)) => ValueType::Float,
      ValueKind::Constant(Constant::Null | Constant::Undef) => ValueType::Pointer,
      ValueKind::Variable { ty, .. }
      | ValueKind::Argument { ty, .. }
      | ValueKind::Global { ty, .. } => *ty,
      ValueKind::Label(_) => ValueType::Void,
      ValueKind::Inst(inst) => inst.result_type(),
    }
  }

  pub fn as_inst(&self) -> Option<&Instruction> {
    match &self.kind {
      ValueKind::Inst(inst) => Some(inst),
      _ => None,
    }
  }

  pub fn as_int_constant(&self) -> Option<i64> {
    match &self.kind {
      ValueKind::Constant(Constant::Int(i)) => Some(*i),
      _ => None,
    }
  }

  pub fn as_label(&self) -> Option<NString> {
    match &self.kind {
      ValueKind::Label(name) => Some(*name),
      _ => None,
    }
  }

  pub fn is_null(&self) -> bool {
    matches!(self.kind, ValueKind::Constant(Constant::Null))
  }

  pub fn is_undef(&self) -> bool {
    matches!(self.kind, ValueKind::Constant(Constant::Undef))
  }

  /// Name for the named kinds; instructions and constants have none.
  pub fn name(&self) -> Option<NString> {
    match &self.kind {
      ValueKind::Variable { name, .. }
      | ValueKind::Argument { name, .. }
      | ValueKind::Global { name, .. }
      | ValueKind::Label(name) => Some(*name),
      _ => None,
    }
  }

  pub fn is_global_named(&self, s: &str) -> bool {
    matches!(&self.kind, ValueKind::Global { name, .. } if *name == s)
  }
}

impl Debug for Value {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.kind {
      ValueKind::Constant(c) => write!(f, "{c:?}"),
      ValueKind::Variable { name, ssa_id, .. } => {
        if *ssa_id >= 0 {
          write!(f, "%{name}_{ssa_id}")
        } else {
          write!(f, "%{name}")
        }
      }
      ValueKind::Argument { name, index, .. } => write!(f, "%{name}_{index}"),
      ValueKind::Global { name, .. } => write!(f, "@{name}"),
      ValueKind::Label(name) => write!(f, "{name}"),
      ValueKind::Inst(inst) => write!(f, "{inst:?}"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn value_identity_is_unique() {
    let a = Value::int(1);
    let b = Value::int(1);
    assert_ne!(a.id(), b.id());
  }

  #[test]
  fn constant_types_follow_tag() {
    assert_eq!(Value::int(3).ty(), ValueType::Integer);
    assert_eq!(Value::null().ty(), ValueType::Pointer);
    assert_eq!(Value::float(1.0).ty(), ValueType::Float);
  }

  #[test]
  fn rendering() {
    assert_eq!(format!("{:?}", Value::variable("x", ValueType::Integer, 2)), "%x_2");
    assert_eq!(format!("{:?}", Value::global("g", ValueType::Integer, false)), "@g");
    assert_eq!(format!("{:?}", Value::null()), "null");
  }
}
