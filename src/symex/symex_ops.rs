
use crate::expr::{BinOp, ExprBuilder};
use crate::ir::{CmpPred, Opcode, ValueRef};

use super::eval::{eval_operand, inst_result_name};
use super::exec_state::ExplorationState;
use super::symex::Symex;

impl<'a, 'ctx> Symex<'a, 'ctx> {
  /// Arithmetic and bitwise results are real expressions over the operand
  /// evaluations, bound under the instruction's result name.
  pub(super) fn symex_arith(&mut self, es: &mut ExplorationState, inst_val: &ValueRef) {
    let inst = inst_val.as_inst().unwrap();
    let (Some(lhs), Some(rhs)) = (inst.operand(0), inst.operand(1)) else { return };
    let a = eval_operand(&self.ctx, &es.state, lhs);
    let b = eval_operand(&self.ctx, &es.state, rhs);

    let op = match inst.opcode() {
      Opcode::Add => BinOp::Add,
      Opcode::Sub => BinOp::Sub,
      Opcode::Mul => BinOp::Mul,
      Opcode::Div => BinOp::Div,
      Opcode::Rem => BinOp::Rem,
      Opcode::And => BinOp::BitAnd,
      Opcode::Or => BinOp::BitOr,
      Opcode::Xor => BinOp::BitXor,
      Opcode::Shl => BinOp::Shl,
      Opcode::Shr => BinOp::Shr,
      _ => unreachable!("not an arithmetic opcode"),
    };

    let result = self.ctx.binary(op, a, b);
    es.state.assign(inst_result_name(inst_val), result);
  }

  /// Comparisons with a known condition code become real predicates;
  /// without one (float compares before a float theory exists) the result
  /// is a fresh boolean symbol.
  pub(super) fn symex_cmp(&mut self, es: &mut ExplorationState, inst_val: &ValueRef) {
    let inst = inst_val.as_inst().unwrap();
    let result = match (inst.pred(), inst.operand(0), inst.operand(1)) {
      (Some(pred), Some(lhs), Some(rhs)) if inst.opcode() == Opcode::ICmp => {
        let a = eval_operand(&self.ctx, &es.state, lhs);
        let b = eval_operand(&self.ctx, &es.state, rhs);
        let op = match pred {
          CmpPred::Eq => BinOp::Eq,
          CmpPred::Ne => BinOp::Ne,
          CmpPred::Lt => BinOp::Lt,
          CmpPred::Le => BinOp::Le,
          CmpPred::Gt => BinOp::Gt,
          CmpPred::Ge => BinOp::Ge,
        };
        self.ctx.binary(op, a, b)
      }
      _ => {
        let fresh = self.fresh_var_name();
        self.ctx.as_bool(self.ctx.variable(fresh))
      }
    };
    es.state.assign(inst_result_name(inst_val), result);
  }

  /// `select cond, a, b`: decided when the condition folds to a constant,
  /// a fresh symbol otherwise.
  pub(super) fn symex_select(&mut self, es: &mut ExplorationState, inst_val: &ValueRef) {
    let inst = inst_val.as_inst().unwrap();
    let (Some(cond), Some(a), Some(b)) = (inst.operand(0), inst.operand(1), inst.operand(2)) else {
      return;
    };
    let mut cond = self.ctx.as_bool(eval_operand(&self.ctx, &es.state, cond));
    cond.simplify();

    let result = if cond.is_true() {
      eval_operand(&self.ctx, &es.state, a)
    } else if cond.is_false() {
      eval_operand(&self.ctx, &es.state, b)
    } else {
      let fresh = self.fresh_var_name();
      self.ctx.variable(fresh)
    };
    es.state.assign(inst_result_name(inst_val), result);
  }

  /// Phi operands come in (label, value) pairs; the incoming block picks
  /// the value.
  pub(super) fn symex_phi(&mut self, es: &mut ExplorationState, inst_val: &ValueRef) {
    let inst = inst_val.as_inst().unwrap();

    let mut selected = None;
    if let Some(pred) = es.pred {
      for pair in inst.operands().chunks(2) {
        if let [label, value] = pair {
          if label.as_label() == Some(pred) {
            selected = Some(eval_operand(&self.ctx, &es.state, value));
            break;
          }
        }
      }
    }

    let result = match selected {
      Some(expr) => expr,
      None => {
        let fresh = self.fresh_var_name();
        self.ctx.variable(fresh)
      }
    };
    es.state.assign(inst_result_name(inst_val), result);
  }

  /// Asserted conditions are assumed along the path.
  pub(super) fn symex_assert(&mut self, es: &mut ExplorationState, inst_val: &ValueRef) {
    let inst = inst_val.as_inst().unwrap();
    let Some(cond) = inst.operand(0) else { return };
    let cond = self.ctx.as_bool(eval_operand(&self.ctx, &es.state, cond));
    es.state.add_constraint(cond);
  }
}
