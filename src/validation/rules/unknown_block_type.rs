//! Rule: Unknown Block Type
//!
//! Reports blocks whose type has no registered executor.

use super::super::{ValidationContext, ValidationRule};
use crate::diagnostics::ValidationError;

pub struct UnknownBlockTypeRule;

impl ValidationRule for UnknownBlockTypeRule {
    fn id(&self) -> &'static str {
        "unknown-block-type"
    }

    fn description(&self) -> &'static str {
        "every block type must have a registered executor"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        ctx.model
            .pipelines
            .iter()
            .flat_map(|pipeline| &pipeline.blocks)
            .filter(|block| ctx.extensions.blocks.get(&block.block_type).is_none())
            .map(|block| {
                ValidationError::error(
                    block.span,
                    format!(
                        "Block '{}' has unknown type '{}'",
                        block.name, block.block_type
                    ),
                    self.id(),
                )
            })
            .collect()
    }
}
