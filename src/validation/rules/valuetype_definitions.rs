//! Rule: Value Type Definitions
//!
//! Constraints attached to a value type must exist and apply to a type the
//! value type converts to. Supertype resolution problems are reported while
//! the type registry is built.

use super::super::{ValidationContext, ValidationRule};
use crate::diagnostics::ValidationError;

pub struct ValuetypeDefinitionsRule;

impl ValidationRule for ValuetypeDefinitionsRule {
    fn id(&self) -> &'static str {
        "valuetype-definitions"
    }

    fn description(&self) -> &'static str {
        "value type constraints must exist and match the value type"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for def in &ctx.model.valuetypes {
            let resolved = ctx.types.resolve_name(&def.name);
            for name in &def.constraints {
                let Some(constraint) = ctx.model.constraint(name) else {
                    errors.push(ValidationError::error(
                        def.span,
                        format!("Value type '{}' uses unknown constraint '{}'", def.name, name),
                        self.id(),
                    ));
                    continue;
                };
                let (Some(valuetype), Some(on)) = (&resolved, ctx.types.resolve(&constraint.on))
                else {
                    continue;
                };
                if !valuetype.is_convertible_to(&on) {
                    errors.push(ValidationError::error(
                        def.span,
                        format!(
                            "Constraint '{}' applies to '{}' and cannot be used on value type '{}'",
                            name, on, def.name
                        ),
                        self.id(),
                    ));
                }
            }
        }
        errors
    }
}
