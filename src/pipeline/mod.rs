//! # Pipeline execution
//!
//! A pipeline is a DAG of blocks connected by pipes. The engine executes the
//! blocks one at a time in topological order, handing each block the output
//! of its single predecessor.
//!
//! ## Failure handling
//!
//! - A block reporting a handled failure is marked `Failed` and everything
//!   downstream of it `Skipped`; unrelated branches keep running.
//! - A block returning an [`ExecutionError`](crate::execution::ExecutionError)
//!   aborts the run.

mod engine;
mod graph;
mod interpreter;
mod result;

pub use engine::PipelineEngine;
pub use graph::{GraphError, PipelineGraph};
pub use interpreter::{interpret_model, InterpreterExitCode, InterpreterOptions};
pub(crate) use interpreter::report_diagnostics;
pub use result::{BlockState, PipelineRunReport};

#[cfg(test)]
mod tests;
