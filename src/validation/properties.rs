//! Property checks shared by blocks and typed constraints

use crate::diagnostics::{Diagnostics, ValidationError};
use crate::execution::PropertySpec;
use crate::expressions::{evaluate_expression, EvaluationContext};
use crate::model::{Expr, PropertyMap, Span};
use crate::valuetypes::InternalValue;

use super::ValidationContext;

/// Unknown names, missing required properties and literal values of the
/// wrong type. Runtime-parameter references are left to their own rule.
pub(crate) fn check_properties(
    owner: &str,
    properties: &PropertyMap,
    specs: &[PropertySpec],
    span: Span,
    ctx: &ValidationContext<'_>,
    rule_id: &'static str,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (name, expr) in properties {
        let Some(spec) = specs.iter().find(|spec| spec.name == name) else {
            errors.push(ValidationError::error(
                expr.span(),
                format!("Unknown property '{}' on {}", name, owner),
                rule_id,
            ));
            continue;
        };
        if matches!(expr, Expr::RuntimeParameter { .. }) {
            continue;
        }

        let mut diagnostics = Diagnostics::new();
        let Some(value) =
            evaluate_expression(expr, &EvaluationContext::new(ctx.types), &mut diagnostics)
        else {
            errors.extend(diagnostics);
            continue;
        };

        if !spec.value_type.is_internal_value_representation(&value) {
            errors.push(ValidationError::error(
                expr.span(),
                format!(
                    "Property '{}' of {} must be a {}, got {} '{}'",
                    name,
                    owner,
                    spec.value_type,
                    value.kind_name(),
                    value
                ),
                rule_id,
            ));
            continue;
        }
        if let Some(message) = dangling_reference(&value, ctx) {
            errors.push(ValidationError::error(expr.span(), message, rule_id));
        }
    }

    for spec in specs.iter().filter(|spec| spec.is_required()) {
        if !properties.contains_key(spec.name) {
            errors.push(ValidationError::error(
                span,
                format!("Missing required property '{}' on {}", spec.name, owner),
                rule_id,
            ));
        }
    }

    errors
}

fn dangling_reference(value: &InternalValue, ctx: &ValidationContext<'_>) -> Option<String> {
    match value {
        InternalValue::Transform(name) if ctx.model.transform(name).is_none() => {
            Some(format!("Unknown transform '{}'", name))
        }
        InternalValue::Constraint(name) if ctx.model.constraint(name).is_none() => {
            Some(format!("Unknown constraint '{}'", name))
        }
        InternalValue::Collection(items) => {
            items.iter().find_map(|item| dangling_reference(item, ctx))
        }
        _ => None,
    }
}
