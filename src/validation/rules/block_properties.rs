//! Rule: Block Properties
//!
//! Checks block properties against the block type's declared properties:
//! no unknown names, every required property present, and every literal
//! value of the declared type. Blocks of unknown type are skipped.

use super::super::{check_properties, ValidationContext, ValidationRule};
use crate::diagnostics::ValidationError;

pub struct BlockPropertiesRule;

impl ValidationRule for BlockPropertiesRule {
    fn id(&self) -> &'static str {
        "block-properties"
    }

    fn description(&self) -> &'static str {
        "block properties must be declared, present when required, and well-typed"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for block in ctx.model.pipelines.iter().flat_map(|p| &p.blocks) {
            let Some(class) = ctx.extensions.blocks.get(&block.block_type) else {
                continue;
            };
            errors.extend(check_properties(
                &format!("block '{}'", block.name),
                &block.properties,
                &class.property_specs,
                block.span,
                ctx,
                self.id(),
            ));
        }
        errors
    }
}
