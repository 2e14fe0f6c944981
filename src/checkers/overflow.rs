
use crate::expr::predicates;
use crate::expr::Expr;
use crate::ir::{Instruction, Opcode};
use crate::report::{Report, Severity, VulnerabilityKind};
use crate::solvers::SolverResult;
use crate::state::SymbolicState;
use crate::symex::eval_operand;

use super::{CheckCtx, Checker};

/// Wrap-around check on add, sub and mul. Unsigned arithmetic uses the
/// width-aware bound when the frontend recorded one, the wrap formulation
/// otherwise. Signed overflow predicates stay constant-false until a
/// bit-vector theory is wired in, so the checker does not fire on signed
/// arithmetic.
pub struct IntegerOverflowChecker;

impl Checker for IntegerOverflowChecker {
  fn name(&self) -> &'static str {
    "IntegerOverflow"
  }

  fn check(&self, cx: &mut CheckCtx, state: &SymbolicState, inst: &Instruction) -> Option<Report> {
    if !matches!(inst.opcode(), Opcode::Add | Opcode::Sub | Opcode::Mul) {
      return None;
    }
    if inst.is_signed() {
      return None;
    }

    let lhs = eval_operand(cx.expr_ctx, state, inst.operand(0)?);
    let rhs = eval_operand(cx.expr_ctx, state, inst.operand(1)?);

    let overflow = match (inst.opcode(), inst.width()) {
      (Opcode::Add, Some(w)) => predicates::add_overflow_with_width(cx.expr_ctx, lhs.clone(), rhs.clone(), w),
      (Opcode::Add, None) => predicates::add_overflow(cx.expr_ctx, lhs.clone(), rhs.clone(), false),
      (Opcode::Sub, _) => predicates::sub_overflow(cx.expr_ctx, lhs.clone(), rhs.clone(), false),
      (Opcode::Mul, Some(w)) => predicates::mul_overflow_with_width(cx.expr_ctx, lhs.clone(), rhs.clone(), w),
      (Opcode::Mul, None) => predicates::mul_overflow(cx.expr_ctx, lhs.clone(), rhs.clone(), false),
      _ => return None,
    };
    if overflow.is_false() {
      return None;
    }

    let mut query: Vec<Expr> = state.path_constraint().constraints().to_vec();
    query.push(overflow);

    match cx.solver.check(&query) {
      SolverResult::Sat => {
        let operation = match inst.opcode() {
          Opcode::Add => "addition",
          Opcode::Sub => "subtraction",
          _ => "multiplication",
        };
        let mut report = Report::new(
          VulnerabilityKind::IntegerOverflow,
          Severity::High,
          inst.loc(),
          format!("Integer overflow detected in {operation}"),
        );

        report.counterexample.insert("lhs".into(), format!("{lhs:?}"));
        report.counterexample.insert("rhs".into(), format!("{rhs:?}"));
        for (var, val) in cx.solver.model().int_values {
          report.counterexample.insert(var, val.to_string());
        }

        report
          .fix_suggestions
          .push("Add overflow checks before arithmetic operations".into());
        report
          .fix_suggestions
          .push("Use wider integer types for intermediate results".into());
        report
          .fix_suggestions
          .push("Use compiler builtins (e.g. __builtin_add_overflow)".into());
        report
          .fix_suggestions
          .push("Enable undefined behavior sanitizer (-fsanitize=undefined)".into());

        Some(report)
      }
      _ => None,
    }
  }
}
