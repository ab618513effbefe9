//! Rule: Constraint Definitions
//!
//! Typed constraints need a registered kind and valid properties;
//! expression constraints need a boolean body over `value`.

use super::super::{check_properties, ValidationContext, ValidationRule};
use crate::diagnostics::{Diagnostics, ValidationError};
use crate::expressions::{infer_expression_type, TypeEnv};
use crate::model::ConstraintBody;
use crate::valuetypes::ValueType;

pub struct ConstraintDefinitionsRule;

impl ValidationRule for ConstraintDefinitionsRule {
    fn id(&self) -> &'static str {
        "constraint-definitions"
    }

    fn description(&self) -> &'static str {
        "constraints must have a known kind or a boolean expression body"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut diagnostics = Diagnostics::new();

        for constraint in &ctx.model.constraints {
            let on = ctx
                .types
                .resolve_or_report(&constraint.on, constraint.span, &mut diagnostics, self.id());

            match &constraint.body {
                ConstraintBody::Typed { kind, properties } => {
                    let Some(executor) = ctx.extensions.constraints.get(kind) else {
                        diagnostics.error(
                            constraint.span,
                            format!("Constraint '{}' has unknown kind '{}'", constraint.name, kind),
                            self.id(),
                        );
                        continue;
                    };
                    diagnostics.extend(check_properties(
                        &format!("constraint '{}'", constraint.name),
                        properties,
                        executor.property_specs(),
                        constraint.span,
                        ctx,
                        self.id(),
                    ));
                }
                ConstraintBody::Expression { expression } => {
                    let Some(on) = on else {
                        continue;
                    };
                    let env = TypeEnv::new(ctx.types).with_value_keyword(on);
                    let Some(body_type) = infer_expression_type(expression, &env, &mut diagnostics)
                    else {
                        continue;
                    };
                    if !body_type.is_convertible_to(&ValueType::Boolean) {
                        diagnostics.error(
                            expression.span(),
                            format!(
                                "Constraint '{}' must evaluate to boolean, got '{}'",
                                constraint.name, body_type
                            ),
                            self.id(),
                        );
                    }
                }
            }
        }

        diagnostics.into_vec()
    }
}
