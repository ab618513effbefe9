//! Rule: Transform Types
//!
//! Input port types and the output type must resolve, port names must be
//! unique, and the body's static type must convert to the declared output.

use std::collections::HashSet;

use super::super::{ValidationContext, ValidationRule};
use crate::diagnostics::{Diagnostics, ValidationError};
use crate::expressions::{infer_expression_type, TypeEnv};
use crate::model::TransformDefinition;

pub struct TransformTypesRule;

impl ValidationRule for TransformTypesRule {
    fn id(&self) -> &'static str {
        "transform-types"
    }

    fn description(&self) -> &'static str {
        "transform bodies must produce their declared output type"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut diagnostics = Diagnostics::new();
        for transform in &ctx.model.transforms {
            self.check_transform(transform, ctx, &mut diagnostics);
        }
        diagnostics.into_vec()
    }
}

impl TransformTypesRule {
    fn check_transform(
        &self,
        transform: &TransformDefinition,
        ctx: &ValidationContext<'_>,
        diagnostics: &mut Diagnostics,
    ) {
        let mut env = TypeEnv::new(ctx.types);
        let mut ports_ok = true;
        let mut seen = HashSet::new();

        for port in &transform.inputs {
            if !seen.insert(port.name.as_str()) {
                diagnostics.error(
                    transform.span,
                    format!(
                        "Transform '{}' declares input '{}' more than once",
                        transform.name, port.name
                    ),
                    self.id(),
                );
            }
            match ctx.types.resolve_or_report(&port.valuetype, transform.span, diagnostics, self.id()) {
                Some(valuetype) => env = env.with_variable(port.name.clone(), valuetype),
                None => ports_ok = false,
            }
        }

        let output = ctx
            .types
            .resolve_or_report(&transform.output, transform.span, diagnostics, self.id());
        if !ports_ok {
            return;
        }

        let Some(body_type) = infer_expression_type(&transform.body, &env, diagnostics) else {
            return;
        };
        if let Some(output) = output {
            if !body_type.is_convertible_to(&output) {
                diagnostics.error(
                    transform.body.span(),
                    format!(
                        "Transform '{}' produces '{}' but declares output type '{}'",
                        transform.name, body_type, output
                    ),
                    self.id(),
                );
            }
        }
    }
}
