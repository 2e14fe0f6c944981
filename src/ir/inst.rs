
use std::fmt::Debug;

use super::value::{SourceLocation, ValueRef, ValueType};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
  // arithmetic
  Add,
  Sub,
  Mul,
  Div,
  Rem,
  // bitwise
  And,
  Or,
  Xor,
  Shl,
  Shr,
  // comparison
  ICmp,
  FCmp,
  // memory
  Alloca,
  Load,
  Store,
  GetElementPtr,
  // control flow
  Br,
  Ret,
  Call,
  // other
  Phi,
  Select,
  Assert,
}

impl Opcode {
  pub fn is_terminator(&self) -> bool {
    matches!(self, Opcode::Br | Opcode::Ret)
  }

  pub fn is_arithmetic(&self) -> bool {
    matches!(self, Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Rem)
  }

  pub fn is_bitwise(&self) -> bool {
    matches!(self, Opcode::And | Opcode::Or | Opcode::Xor | Opcode::Shl | Opcode::Shr)
  }

  pub fn mnemonic(&self) -> &'static str {
    match self {
      Opcode::Add => "add",
      Opcode::Sub => "sub",
      Opcode::Mul => "mul",
      Opcode::Div => "div",
      Opcode::Rem => "rem",
      Opcode::And => "and",
      Opcode::Or => "or",
      Opcode::Xor => "xor",
      Opcode::Shl => "shl",
      Opcode::Shr => "shr",
      Opcode::ICmp => "icmp",
      Opcode::FCmp => "fcmp",
      Opcode::Alloca => "alloca",
      Opcode::Load => "load",
      Opcode::Store => "store",
      Opcode::GetElementPtr => "getelementptr",
      Opcode::Br => "br",
      Opcode::Ret => "ret",
      Opcode::Call => "call",
      Opcode::Phi => "phi",
      Opcode::Select => "select",
      Opcode::Assert => "assert",
    }
  }
}

impl Debug for Opcode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.mnemonic())
  }
}

/// Condition code for `ICmp` / `FCmp`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpPred {
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
}

impl Debug for CmpPred {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Eq => write!(f, "eq"),
      Self::Ne => write!(f, "ne"),
      Self::Lt => write!(f, "lt"),
      Self::Le => write!(f, "le"),
      Self::Gt => write!(f, "gt"),
      Self::Ge => write!(f, "ge"),
    }
  }
}

/// One IR instruction: an opcode, an append-only operand list and a source
/// location. Comparisons carry a condition code; arithmetic carries the
/// signedness and, when the frontend knows it, the integer bit-width.
pub struct Instruction {
  opcode: Opcode,
  operands: Vec<ValueRef>,
  loc: SourceLocation,
  pred: Option<CmpPred>,
  signed: bool,
  width: Option<u8>,
}

impl Instruction {
  pub fn new(opcode: Opcode, loc: SourceLocation) -> Self {
    Instruction { opcode, operands: Vec::new(), loc, pred: None, signed: true, width: None }
  }

  pub fn with_pred(mut self, pred: CmpPred) -> Self {
    debug_assert!(matches!(self.opcode, Opcode::ICmp | Opcode::FCmp));
    self.pred = Some(pred);
    self
  }

  pub fn with_signedness(mut self, signed: bool, width: Option<u8>) -> Self {
    self.signed = signed;
    self.width = width;
    self
  }

  pub fn add_operand(&mut self, operand: ValueRef) {
    self.operands.push(operand);
  }

  pub fn with_operands(mut self, operands: Vec<ValueRef>) -> Self {
    for op in operands {
      self.add_operand(op);
    }
    self
  }

  pub fn opcode(&self) -> Opcode {
    self.opcode
  }

  pub fn operands(&self) -> &[ValueRef] {
    &self.operands
  }

  pub fn operand(&self, i: usize) -> Option<&ValueRef> {
    self.operands.get(i)
  }

  pub fn loc(&self) -> SourceLocation {
    self.loc
  }

  pub fn pred(&self) -> Option<CmpPred> {
    self.pred
  }

  pub fn is_signed(&self) -> bool {
    self.signed
  }

  pub fn width(&self) -> Option<u8> {
    self.width
  }

  pub fn result_type(&self) -> ValueType {
    match self.opcode {
      Opcode::Add
      | Opcode::Sub
      | Opcode::Mul
      | Opcode::Div
      | Opcode::Rem
      | Opcode::And
      | Opcode::Or
      | Opcode::Xor
      | Opcode::Shl
      | Opcode::Shr
      | Opcode::ICmp
      | Opcode::FCmp
      | Opcode::Load
      | Opcode::Phi
      | Opcode::Select => ValueType::Integer,
      Opcode::Alloca | Opcode::GetElementPtr | Opcode::Call => ValueType::Pointer,
      Opcode::Store | Opcode::Br | Opcode::Ret | Opcode::Assert => ValueType::Void,
    }
  }
}

impl Debug for Instruction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self.opcode)?;
    if let Some(pred) = self.pred {
      write!(f, " {pred:?}")?;
    }
    for (i, op) in self.operands.iter().enumerate() {
      if i > 0 {
        write!(f, ",")?;
      }
      write!(f, " {op:?}")?;
    }
    Ok(())
  }
}
