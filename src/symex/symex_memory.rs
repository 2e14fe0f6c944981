
use crate::expr::ExprBuilder;
use crate::ir::ValueRef;

use super::eval::{eval_operand, inst_result_name};
use super::exec_state::ExplorationState;
use super::symex::Symex;

impl<'a, 'ctx> Symex<'a, 'ctx> {
  /// Stack allocation binds a fresh symbolic base address. The bounds
  /// checker reads the size straight from the instruction's operand.
  pub(super) fn symex_alloca(&mut self, es: &mut ExplorationState, inst_val: &ValueRef) {
    let fresh = self.fresh_var_name();
    let address = self.ctx.variable(fresh);
    es.state.assign(inst_result_name(inst_val), address);
  }

  /// `load addr`: the heap answers the last value written through the
  /// same address term, or the undefined sentinel.
  pub(super) fn symex_load(&mut self, es: &mut ExplorationState, inst_val: &ValueRef) {
    let inst = inst_val.as_inst().unwrap();
    let Some(addr) = inst.operand(0) else { return };
    let addr = eval_operand(&self.ctx, &es.state, addr);
    let value = es.state.heap().load(&self.ctx, &addr, None);
    es.state.assign(inst_result_name(inst_val), value);
  }

  /// `store value, addr`.
  pub(super) fn symex_store(&mut self, es: &mut ExplorationState, inst_val: &ValueRef) {
    let inst = inst_val.as_inst().unwrap();
    let (Some(value), Some(addr)) = (inst.operand(0), inst.operand(1)) else { return };
    let value = eval_operand(&self.ctx, &es.state, value);
    let addr = eval_operand(&self.ctx, &es.state, addr);
    es.state.heap_mut().store(&addr, None, value);
  }

  /// `getelementptr base, index` is address arithmetic.
  pub(super) fn symex_gep(&mut self, es: &mut ExplorationState, inst_val: &ValueRef) {
    let inst = inst_val.as_inst().unwrap();
    let (Some(base), Some(index)) = (inst.operand(0), inst.operand(1)) else { return };
    let base = eval_operand(&self.ctx, &es.state, base);
    let index = eval_operand(&self.ctx, &es.state, index);
    let result = self.ctx.add(base, index);
    es.state.assign(inst_result_name(inst_val), result);
  }

  /// Allocator entry points are modeled; any other callee is an unknown
  /// effect and leaves the state alone.
  pub(super) fn symex_call(&mut self, es: &mut ExplorationState, inst_val: &ValueRef) {
    let inst = inst_val.as_inst().unwrap();
    let Some(callee) = inst.operand(0) else { return };

    if callee.is_global_named("malloc") {
      let size = match inst.operand(1) {
        Some(arg) => eval_operand(&self.ctx, &es.state, arg),
        None => self.ctx.constant_int(0),
      };
      let address = es.state.heap_mut().allocate(&self.ctx, size, inst.loc());
      es.state.assign(inst_result_name(inst_val), address);
      return;
    }

    if callee.is_global_named("calloc") {
      let count = match inst.operand(1) {
        Some(arg) => eval_operand(&self.ctx, &es.state, arg),
        None => self.ctx.constant_int(0),
      };
      let elem = match inst.operand(2) {
        Some(arg) => eval_operand(&self.ctx, &es.state, arg),
        None => self.ctx.constant_int(1),
      };
      let size = self.ctx.mul(count, elem);
      let address = es.state.heap_mut().allocate(&self.ctx, size, inst.loc());
      es.state.assign(inst_result_name(inst_val), address);
      return;
    }

    if callee.is_global_named("free") {
      if let Some(arg) = inst.operand(1) {
        let addr = eval_operand(&self.ctx, &es.state, arg);
        // the double-free checker already saw the pre-free heap
        let _ = es.state.heap_mut().free(&addr);
      }
    }
  }
}
