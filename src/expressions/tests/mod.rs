//! Tests for expression evaluation
//!
//! Organized by area


use crate::diagnostics::Diagnostics;
use crate::model::Expr;
use crate::valuetypes::{InternalValue, TypeRegistry};

use super::{evaluate_expression, EvaluationContext};

/// Evaluate with no bindings, returning the value and every reported message
pub(super) fn eval(expr: &Expr) -> (Option<InternalValue>, Vec<String>) {
    let types = TypeRegistry::builtin();
    eval_in(expr, &EvaluationContext::new(&types))
}

pub(super) fn eval_in(
    expr: &Expr,
    ctx: &EvaluationContext<'_>,
) -> (Option<InternalValue>, Vec<String>) {
    let mut diagnostics = Diagnostics::new();
    let value = evaluate_expression(expr, ctx, &mut diagnostics);
    let messages = diagnostics.iter().map(|d| d.message.clone()).collect();
    (value, messages)
}
