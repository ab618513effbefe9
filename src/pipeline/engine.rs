//! Sequential pipeline executor

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info};

use super::{BlockState, PipelineGraph, PipelineRunReport};
use crate::blocks::BlockOutcome;
use crate::data::IoValue;
use crate::execution::{ExecutionContext, ExecutionError, Logger, RunEnvironment, StackNode};
use crate::model::{Block, Pipeline};

pub struct PipelineEngine<'a> {
    env: RunEnvironment<'a>,
}

impl<'a> PipelineEngine<'a> {
    pub fn new(env: RunEnvironment<'a>) -> Self {
        Self { env }
    }

    /// Run every block of `pipeline`.
    ///
    /// `Ok` means the run completed, not that every block succeeded; check
    /// [`PipelineRunReport::succeeded`].
    pub async fn run(
        &self,
        pipeline: &'a Pipeline,
        logger: Box<dyn Logger>,
    ) -> Result<PipelineRunReport, ExecutionError> {
        let graph = PipelineGraph::build(pipeline)?;
        let mut report = PipelineRunReport::start(pipeline);
        let mut ctx = ExecutionContext::new(pipeline, self.env, logger);
        info!(pipeline = %pipeline.name, run_id = %report.run_id, blocks = pipeline.blocks.len(), "Starting pipeline");

        // Outputs waiting for consumers, with the number of consumers left
        let mut outputs: HashMap<&str, (IoValue, usize)> = HashMap::new();

        for block in graph.topological_order() {
            if report.state(&block.name) == Some(BlockState::Skipped) {
                continue;
            }

            let input = match graph.predecessor(&block.name) {
                Some(predecessor) => take_output(&mut outputs, &predecessor.name),
                None => IoValue::None,
            };

            report.set_state(&block.name, BlockState::Running);
            match self.execute_block(block, input, &mut ctx).await? {
                BlockOutcome::Produced(output) => {
                    report.set_state(&block.name, BlockState::Succeeded);
                    let consumers = graph.successors(&block.name).len();
                    if consumers > 0 {
                        outputs.insert(&block.name, (output, consumers));
                    }
                }
                BlockOutcome::HandledFailure => {
                    report.set_state(&block.name, BlockState::Failed);
                    for skipped in graph.descendants(&block.name) {
                        debug!(block = %skipped.name, failed = %block.name, "Skipping block");
                        report.set_state(&skipped.name, BlockState::Skipped);
                    }
                }
            }
        }

        report.finish();
        let summary = report.summary();
        if report.succeeded() {
            ctx.log_info(format!("Pipeline finished: {}", summary));
        } else {
            ctx.log_error(format!("Pipeline finished with failures: {}", summary), None);
        }
        Ok(report)
    }

    /// Errors are logged at the block's location before they propagate
    async fn execute_block(
        &self,
        block: &'a Block,
        input: IoValue,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<BlockOutcome, ExecutionError> {
        let mut scoped = ctx.enter_node(StackNode::Block(block));
        let result = self.execute_in_scope(block, input, &mut scoped).await;
        if let Err(e) = &result {
            scoped.log_error(e.to_string(), None);
        }
        result
    }

    async fn execute_in_scope(
        &self,
        block: &'a Block,
        input: IoValue,
        ctx: &mut ExecutionContext<'a>,
    ) -> Result<BlockOutcome, ExecutionError> {
        let class = self
            .env
            .extensions
            .blocks
            .get(&block.block_type)
            .ok_or_else(|| ExecutionError::UnknownBlockType(block.block_type.clone()))?;

        if input.io_type() != class.input_type {
            return Err(ExecutionError::IoTypeMismatch {
                block: block.name.clone(),
                expected: class.input_type,
                actual: input.io_type(),
            });
        }

        ctx.log_debug(format!("Executing block of type {}", class.block_type));
        let started = Instant::now();
        let executor = class.instantiate();
        let outcome = executor.execute(input, ctx).await?;

        if let BlockOutcome::Produced(output) = &outcome {
            if output.io_type() != class.output_type {
                return Err(ExecutionError::IoTypeMismatch {
                    block: block.name.clone(),
                    expected: class.output_type,
                    actual: output.io_type(),
                });
            }
            ctx.log_debug_value(output);
        }
        ctx.log_debug(format!(
            "Execution took {} ms",
            started.elapsed().as_millis()
        ));
        Ok(outcome)
    }
}

/// Move the output to its last consumer, clone it for the others
fn take_output(outputs: &mut HashMap<&str, (IoValue, usize)>, producer: &str) -> IoValue {
    let remaining = outputs.get(producer).map_or(0, |(_, remaining)| *remaining);
    match remaining {
        0 => IoValue::None,
        1 => outputs
            .remove(producer)
            .map_or(IoValue::None, |(value, _)| value),
        _ => match outputs.get_mut(producer) {
            Some((value, remaining)) => {
                *remaining -= 1;
                value.clone()
            }
            None => IoValue::None,
        },
    }
}
