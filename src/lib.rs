pub mod blocks;
pub mod cli;
pub mod config;
pub mod constraints;
pub mod data;
pub mod db;
pub mod diagnostics;
pub mod execution;
pub mod expressions;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod validation;
pub mod valuetypes;

#[cfg(test)]
mod test_helpers;

// Re-export the entry points embedders need
pub use blocks::ExtensionRegistry;
pub use model::{load_model, parse_model, Model, ModelFormat};
pub use pipeline::{interpret_model, InterpreterExitCode, InterpreterOptions};
