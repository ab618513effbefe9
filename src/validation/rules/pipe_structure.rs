//! Rule: Pipe Structure
//!
//! Pipes must connect existing blocks of the same pipeline, every block has
//! at most one incoming pipe, pipelines are acyclic, and the IO types on
//! both ends of a pipe agree. A block without an incoming pipe must accept
//! no input.

use std::collections::{HashMap, HashSet};

use super::super::{ValidationContext, ValidationRule};
use crate::data::IoType;
use crate::diagnostics::ValidationError;
use crate::model::Pipeline;
use crate::pipeline::{GraphError, PipelineGraph};

pub struct PipeStructureRule;

impl ValidationRule for PipeStructureRule {
    fn id(&self) -> &'static str {
        "pipe-structure"
    }

    fn description(&self) -> &'static str {
        "pipes must form an acyclic, single-input graph with matching IO types"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        ctx.model
            .pipelines
            .iter()
            .flat_map(|pipeline| self.check_pipeline(pipeline, ctx))
            .collect()
    }
}

impl PipeStructureRule {
    fn check_pipeline(&self, pipeline: &Pipeline, ctx: &ValidationContext<'_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let mut names = HashSet::new();
        for block in &pipeline.blocks {
            if !names.insert(block.name.as_str()) {
                errors.push(ValidationError::error(
                    block.span,
                    GraphError::DuplicateBlock(block.name.clone()).to_string(),
                    self.id(),
                ));
            }
        }

        let mut incoming: HashMap<&str, usize> = HashMap::new();
        for pipe in &pipeline.pipes {
            for end in [&pipe.from, &pipe.to] {
                if !names.contains(end.as_str()) {
                    errors.push(ValidationError::error(
                        pipe.span,
                        GraphError::UnknownBlock(end.clone()).to_string(),
                        self.id(),
                    ));
                }
            }
            let count = incoming.entry(pipe.to.as_str()).or_default();
            *count += 1;
            if *count == 2 {
                errors.push(ValidationError::error(
                    pipe.span,
                    GraphError::MultipleInputs(pipe.to.clone()).to_string(),
                    self.id(),
                ));
            }

            let from_class = pipeline
                .block(&pipe.from)
                .and_then(|b| ctx.extensions.blocks.get(&b.block_type));
            let to_class = pipeline
                .block(&pipe.to)
                .and_then(|b| ctx.extensions.blocks.get(&b.block_type));
            if let (Some(from), Some(to)) = (from_class, to_class) {
                if from.output_type != to.input_type {
                    errors.push(ValidationError::error(
                        pipe.span,
                        format!(
                            "Block '{}' produces {} but block '{}' expects {}",
                            pipe.from, from.output_type, pipe.to, to.input_type
                        ),
                        self.id(),
                    ));
                }
            }
        }

        for block in &pipeline.blocks {
            let Some(class) = ctx.extensions.blocks.get(&block.block_type) else {
                continue;
            };
            if class.input_type != IoType::None && !incoming.contains_key(block.name.as_str()) {
                errors.push(ValidationError::error(
                    block.span,
                    format!(
                        "Block '{}' expects {} input but has no incoming pipe",
                        block.name, class.input_type
                    ),
                    self.id(),
                ));
            }
        }

        // Cycles are only meaningful once the endpoints are sound
        if errors.is_empty() {
            if let Err(e @ GraphError::Cycle(_)) = PipelineGraph::build(pipeline) {
                errors.push(ValidationError::error(pipeline.span, e.to_string(), self.id()));
            }
        }

        if pipeline.blocks.is_empty() {
            errors.push(ValidationError::warning(
                pipeline.span,
                format!("Pipeline '{}' has no blocks", pipeline.name),
                self.id(),
            ));
        }

        errors
    }
}
