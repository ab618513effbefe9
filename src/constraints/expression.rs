use crate::diagnostics::Diagnostics;
use crate::execution::{ExecutionContext, ExecutionError};
use crate::expressions::evaluate_expression;
use crate::model::Expr;
use crate::valuetypes::InternalValue;

/// Valid iff `expression` evaluates to `true` with `value` bound
pub fn is_valid_by_expression(
    expression: &Expr,
    value: &InternalValue,
    ctx: &mut ExecutionContext<'_>,
) -> Result<bool, ExecutionError> {
    let eval_ctx = ctx.evaluation_context().with_value_keyword(value.clone());
    let mut diagnostics = Diagnostics::new();

    match evaluate_expression(expression, &eval_ctx, &mut diagnostics) {
        Some(InternalValue::Boolean(valid)) => Ok(valid),
        Some(other) => {
            ctx.log_error(
                format!(
                    "Constraint expression produced {} '{}' instead of a boolean",
                    other.kind_name(),
                    other
                ),
                None,
            );
            Ok(false)
        }
        None => {
            for diagnostic in diagnostics {
                ctx.log_debug(format!("Value '{}': {}", value, diagnostic.message));
            }
            Ok(false)
        }
    }
}
