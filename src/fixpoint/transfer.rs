
use crate::domain::{AbstractStore, ConstantVal, Interval, Lattice};
use crate::ir::{Opcode, Value, ValueKind, ValueRef};
use crate::symbol::nstring::NString;

/// Abstract semantics of one instruction: maps an incoming store to the
/// store after the instruction.
pub trait Transfer {
  type Value: Lattice;

  fn transfer(&self, inst: &ValueRef, store: &AbstractStore<Self::Value>) -> AbstractStore<Self::Value>;
}

/// Name an instruction's result is bound under in the abstract store.
pub(crate) fn result_name(inst: &Value) -> NString {
  NString::from(format!("v{}", inst.id()))
}

fn operand_name(operand: &ValueRef) -> Option<NString> {
  match operand.kind() {
    ValueKind::Inst(_) => Some(result_name(operand)),
    _ => operand.name(),
  }
}

/// Partial, conservative transfer over the interval domain. Arithmetic
/// computes a fresh interval from the operand ranges; alloca and load
/// produce ⊤; stores, branches, returns and calls leave the store alone.
pub struct IntervalTransfer;

impl IntervalTransfer {
  pub fn new() -> Self {
    IntervalTransfer
  }

  fn eval(&self, operand: &ValueRef, store: &AbstractStore<Interval>) -> Interval {
    if let Some(c) = operand.as_int_constant() {
      return Interval::singleton(c);
    }
    match operand_name(operand).and_then(|name| store.lookup(name).cloned()) {
      Some(v) => v,
      None => Interval::Top,
    }
  }
}

impl Default for IntervalTransfer {
  fn default() -> Self {
    IntervalTransfer::new()
  }
}

impl Transfer for IntervalTransfer {
  type Value = Interval;

  fn transfer(&self, inst_val: &ValueRef, store: &AbstractStore<Interval>) -> AbstractStore<Interval> {
    let Some(inst) = inst_val.as_inst() else { return store.clone() };
    let mut out = store.clone();

    match inst.opcode() {
      Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
        if let (Some(lhs), Some(rhs)) = (inst.operand(0), inst.operand(1)) {
          let a = self.eval(lhs, store);
          let b = self.eval(rhs, store);
          let result = match inst.opcode() {
            Opcode::Add => a.add(&b),
            Opcode::Sub => a.sub(&b),
            Opcode::Mul => a.mul(&b),
            _ => a.div(&b),
          };
          out.bind(result_name(inst_val), result);
        }
      }
      Opcode::Alloca | Opcode::Load => {
        out.bind(result_name(inst_val), Interval::Top);
      }
      // callee effects are modeled conservatively; the store survives
      Opcode::Store | Opcode::Br | Opcode::Ret | Opcode::Call => {}
      _ => {}
    }

    out
  }
}

/// Same shape over the flat constant domain.
pub struct ConstantTransfer;

impl ConstantTransfer {
  pub fn new() -> Self {
    ConstantTransfer
  }

  fn eval(&self, operand: &ValueRef, store: &AbstractStore<ConstantVal>) -> ConstantVal {
    if let Some(c) = operand.as_int_constant() {
      return ConstantVal::Int(c);
    }
    match operand_name(operand).and_then(|name| store.lookup(name).cloned()) {
      Some(v) => v,
      None => ConstantVal::Top,
    }
  }
}

impl Default for ConstantTransfer {
  fn default() -> Self {
    ConstantTransfer::new()
  }
}

impl Transfer for ConstantTransfer {
  type Value = ConstantVal;

  fn transfer(&self, inst_val: &ValueRef, store: &AbstractStore<ConstantVal>) -> AbstractStore<ConstantVal> {
    let Some(inst) = inst_val.as_inst() else { return store.clone() };
    let mut out = store.clone();

    match inst.opcode() {
      Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
        if let (Some(lhs), Some(rhs)) = (inst.operand(0), inst.operand(1)) {
          let a = self.eval(lhs, store);
          let b = self.eval(rhs, store);
          let result = match inst.opcode() {
            Opcode::Add => a.add(&b),
            Opcode::Sub => a.sub(&b),
            Opcode::Mul => a.mul(&b),
            _ => a.div(&b),
          };
          out.bind(result_name(inst_val), result);
        }
      }
      Opcode::Alloca | Opcode::Load => {
        out.bind(result_name(inst_val), ConstantVal::Top);
      }
      Opcode::Store | Opcode::Br | Opcode::Ret | Opcode::Call => {}
      _ => {}
    }

    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ir::{Instruction, SourceLocation, Value};

  fn add_inst(lhs: ValueRef, rhs: ValueRef) -> ValueRef {
    let mut inst = Instruction::new(Opcode::Add, SourceLocation::invalid());
    inst.add_operand(lhs);
    inst.add_operand(rhs);
    Value::inst(inst)
  }

  #[test]
  fn constant_operands_make_singletons() {
    let t = IntervalTransfer::new();
    let inst = add_inst(Value::int(2), Value::int(3));
    let out = t.transfer(&inst, &AbstractStore::new());
    assert_eq!(out.lookup(result_name(&inst)), Some(&Interval::singleton(5)));
  }

  #[test]
  fn variable_operands_read_the_store() {
    let t = IntervalTransfer::new();
    let x = Value::variable("x", crate::ir::ValueType::Integer, -1);
    let inst = add_inst(x, Value::int(1));
    let mut store = AbstractStore::new();
    store.bind("x", Interval::int(0, 9));
    let out = t.transfer(&inst, &store);
    assert_eq!(out.lookup(result_name(&inst)), Some(&Interval::int(1, 10)));
  }

  #[test]
  fn unknown_operand_is_top() {
    let t = IntervalTransfer::new();
    let y = Value::variable("y", crate::ir::ValueType::Integer, -1);
    let inst = add_inst(y, Value::int(1));
    let out = t.transfer(&inst, &AbstractStore::new());
    assert_eq!(out.lookup(result_name(&inst)), Some(&Interval::Top));
  }

  #[test]
  fn loads_and_allocas_are_top() {
    let t = IntervalTransfer::new();
    let inst = Value::inst(Instruction::new(Opcode::Load, SourceLocation::invalid()));
    let out = t.transfer(&inst, &AbstractStore::new());
    assert_eq!(out.lookup(result_name(&inst)), Some(&Interval::Top));
  }

  #[test]
  fn stores_are_identity() {
    let t = IntervalTransfer::new();
    let inst = Value::inst(Instruction::new(Opcode::Store, SourceLocation::invalid()));
    let mut store = AbstractStore::new();
    store.bind("x", Interval::singleton(1));
    let out = t.transfer(&inst, &store);
    assert_eq!(out, store);
  }

  #[test]
  fn constant_domain_folds() {
    let t = ConstantTransfer::new();
    let inst = add_inst(Value::int(40), Value::int(2));
    let out = t.transfer(&inst, &AbstractStore::new());
    assert_eq!(out.lookup(result_name(&inst)), Some(&ConstantVal::Int(42)));
  }
}
