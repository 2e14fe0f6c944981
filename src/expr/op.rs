
use std::fmt::Debug;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
  // arithmetic
  Add,
  Sub,
  Mul,
  Div,
  Rem,
  // bitwise
  BitAnd,
  BitOr,
  BitXor,
  Shl,
  Shr,
  // comparison
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  // logical
  And,
  Or,
  Implies,
}

impl BinOp {
  pub fn is_comparison(&self) -> bool {
    matches!(self, BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge)
  }

  pub fn is_logical(&self) -> bool {
    matches!(self, BinOp::And | BinOp::Or | BinOp::Implies)
  }

  /// Comparisons and logical connectives yield booleans, the rest integers.
  pub fn yields_bool(&self) -> bool {
    self.is_comparison() || self.is_logical()
  }
}

impl Debug for BinOp {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Add => write!(f, "+"),
      Self::Sub => write!(f, "-"),
      Self::Mul => write!(f, "*"),
      Self::Div => write!(f, "/"),
      Self::Rem => write!(f, "%"),
      Self::BitAnd => write!(f, "&"),
      Self::BitOr => write!(f, "|"),
      Self::BitXor => write!(f, "^"),
      Self::Shl => write!(f, "<<"),
      Self::Shr => write!(f, ">>"),
      Self::Eq => write!(f, "=="),
      Self::Ne => write!(f, "!="),
      Self::Lt => write!(f, "<"),
      Self::Le => write!(f, "<="),
      Self::Gt => write!(f, ">"),
      Self::Ge => write!(f, ">="),
      Self::And => write!(f, "&&"),
      Self::Or => write!(f, "||"),
      Self::Implies => write!(f, "=>"),
    }
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
  /// Arithmetic negation.
  Neg,
  /// Bitwise complement.
  BitNot,
  /// Logical negation.
  Not,
}

impl Debug for UnOp {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Neg => write!(f, "-"),
      Self::BitNot => write!(f, "~"),
      Self::Not => write!(f, "!"),
    }
  }
}
