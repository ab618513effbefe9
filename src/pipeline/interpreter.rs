//! Whole-model entry point: validate, then run every pipeline

use tracing::{error, info, warn};

use super::PipelineEngine;
use crate::blocks::ExtensionRegistry;
use crate::diagnostics::Diagnostics;
use crate::execution::{DebugConfig, Logger, RunEnvironment, RuntimeParameterProvider};
use crate::model::Model;
use crate::validation::check_model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterExitCode {
    Success,
    Failure,
}

impl InterpreterExitCode {
    /// Process exit status
    pub fn code(self) -> i32 {
        match self {
            InterpreterExitCode::Success => 0,
            InterpreterExitCode::Failure => 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterpreterOptions {
    pub runtime_parameters: RuntimeParameterProvider,
    pub debug: DebugConfig,
}

/// Validate `model` and, when it is free of errors, run its pipelines one
/// after another.
///
/// Every validation error is reported before giving up. A block failing with
/// a handled error fails its own pipeline only; a fatal execution error stops
/// the whole invocation.
pub async fn interpret_model<L>(
    model: &Model,
    extensions: &ExtensionRegistry,
    options: &InterpreterOptions,
    logger: L,
) -> InterpreterExitCode
where
    L: Logger + Clone + 'static,
{
    let (types, diagnostics) = check_model(model, extensions, &options.runtime_parameters);
    report_diagnostics(&diagnostics);
    if diagnostics.has_errors() {
        error!(
            errors = diagnostics.errors().count(),
            "Model has errors, no pipeline was executed"
        );
        return InterpreterExitCode::Failure;
    }

    let env = RunEnvironment {
        model,
        types: &types,
        extensions,
        runtime_parameters: &options.runtime_parameters,
        debug: &options.debug,
    };
    let engine = PipelineEngine::new(env);

    let mut exit = InterpreterExitCode::Success;
    for pipeline in &model.pipelines {
        match engine.run(pipeline, Box::new(logger.clone())).await {
            Ok(report) => {
                info!(
                    pipeline = %report.pipeline,
                    run_id = %report.run_id,
                    duration_ms = report.duration_ms().unwrap_or_default(),
                    "{}",
                    report.summary()
                );
                if !report.succeeded() {
                    exit = InterpreterExitCode::Failure;
                }
            }
            Err(e) => {
                error!(pipeline = %pipeline.name, "Fatal error, aborting: {}", e);
                return InterpreterExitCode::Failure;
            }
        }
    }
    exit
}

pub(crate) fn report_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        if diagnostic.is_error() {
            error!("{}", diagnostic);
        } else {
            warn!("{}", diagnostic);
        }
    }
}
