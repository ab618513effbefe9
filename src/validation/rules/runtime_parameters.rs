//! Rule: Runtime Parameters
//!
//! Every `requires NAME` property value must have a supplied value that
//! parses as the property's declared type.

use super::super::{ValidationContext, ValidationRule};
use crate::diagnostics::ValidationError;
use crate::execution::PropertySpec;
use crate::model::{ConstraintBody, Expr, PropertyMap};
use crate::valuetypes::parse_value_representation;

pub struct RuntimeParametersRule;

impl ValidationRule for RuntimeParametersRule {
    fn id(&self) -> &'static str {
        "runtime-parameters"
    }

    fn description(&self) -> &'static str {
        "runtime parameters must be supplied and parse as the property type"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for block in ctx.model.pipelines.iter().flat_map(|p| &p.blocks) {
            let specs = ctx
                .extensions
                .blocks
                .get(&block.block_type)
                .map(|class| class.property_specs.as_slice());
            self.check(&block.properties, specs, ctx, &mut errors);
        }

        for constraint in &ctx.model.constraints {
            if let ConstraintBody::Typed { kind, properties } = &constraint.body {
                let specs = ctx
                    .extensions
                    .constraints
                    .get(kind)
                    .map(|executor| executor.property_specs());
                self.check(properties, specs, ctx, &mut errors);
            }
        }

        errors
    }
}

impl RuntimeParametersRule {
    fn check(
        &self,
        properties: &PropertyMap,
        specs: Option<&[PropertySpec]>,
        ctx: &ValidationContext<'_>,
        errors: &mut Vec<ValidationError>,
    ) {
        for (property, expr) in properties {
            let Expr::RuntimeParameter { name, span } = expr else {
                continue;
            };
            let Some(raw) = ctx.runtime_parameters.get_raw_value(name) else {
                errors.push(ValidationError::error(
                    *span,
                    format!(
                        "Runtime parameter '{}' required by property '{}' is not set; pass it with -e {}=<value>",
                        name, property, name
                    ),
                    self.id(),
                ));
                continue;
            };
            let spec = specs.and_then(|specs| specs.iter().find(|spec| spec.name == property));
            if let Some(spec) = spec {
                if parse_value_representation(raw, &spec.value_type).is_none() {
                    errors.push(ValidationError::error(
                        *span,
                        format!(
                            "Runtime parameter '{}' has value '{}', which is not a valid {}",
                            name, raw, spec.value_type
                        ),
                        self.id(),
                    ));
                }
            }
        }
    }
}
