
use crate::expr::{Expr, ExprBuilder, ExprCtx};
use crate::ir::{Constant, Value, ValueKind, ValueRef};
use crate::state::SymbolicState;
use crate::symbol::nstring::NString;

/// Store key for an instruction's result.
pub(crate) fn inst_result_name(value: &Value) -> NString {
  NString::from(format!("v{}", value.id()))
}

/// Symbolic value of an operand under the current store. Pure: unbound
/// names evaluate to a variable of the same name, which hash-consing makes
/// deterministic, so no binding is needed to keep occurrences consistent.
pub(crate) fn eval_operand(ctx: &ExprCtx, state: &SymbolicState, value: &ValueRef) -> Expr {
  match value.kind() {
    ValueKind::Constant(Constant::Int(i)) => ctx.constant_int(*i),
    ValueKind::Constant(Constant::Null) => ctx.constant_int(0),
    // no float theory yet; floats and undef stay opaque symbols
    ValueKind::Constant(Constant::Float(_)) => ctx.variable(NString::from(format!("float_v{}", value.id()))),
    ValueKind::Constant(Constant::Undef) => ctx.variable(NString::from(format!("undef_v{}", value.id()))),
    ValueKind::Variable { name, .. } | ValueKind::Argument { name, .. } | ValueKind::Global { name, .. } => {
      match state.lookup(*name) {
        Some(expr) => expr.clone(),
        None => ctx.variable(*name),
      }
    }
    ValueKind::Label(name) => ctx.variable(*name),
    ValueKind::Inst(_) => {
      let name = inst_result_name(value);
      match state.lookup(name) {
        Some(expr) => expr.clone(),
        None => ctx.variable(name),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expr::new_ctx;
  use crate::ir::ValueType;

  #[test]
  fn constants_and_null() {
    let ctx = new_ctx();
    let state = SymbolicState::new();
    assert_eq!(eval_operand(&ctx, &state, &Value::int(7)), ctx.constant_int(7));
    assert_eq!(eval_operand(&ctx, &state, &Value::null()), ctx.constant_int(0));
  }

  #[test]
  fn bound_names_read_the_store() {
    let ctx = new_ctx();
    let mut state = SymbolicState::new();
    state.assign("x", ctx.constant_int(3));
    let x = Value::variable("x", ValueType::Integer, -1);
    assert_eq!(eval_operand(&ctx, &state, &x), ctx.constant_int(3));
  }

  #[test]
  fn unbound_names_become_symbols() {
    let ctx = new_ctx();
    let state = SymbolicState::new();
    let y = Value::variable("y", ValueType::Integer, -1);
    let e = eval_operand(&ctx, &state, &y);
    assert_eq!(e.extract_var().unwrap(), "y");
    // deterministic across evaluations
    assert_eq!(eval_operand(&ctx, &state, &y), e);
  }
}
