//! Errors raised while a pipeline runs
//!
//! Returning one of these from a block aborts the whole interpreter run.
//! Handled failures, which only stop one branch, are
//! [`BlockOutcome::HandledFailure`](crate::blocks::BlockOutcome) instead.

use thiserror::Error;

use crate::data::{IoType, TableError};
use crate::pipeline::GraphError;
use crate::valuetypes::ValueTypeError;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Property '{property}' is not set and has no default value")]
    MissingProperty { property: String },

    #[error("Runtime parameter '{parameter}' required by property '{property}' was not supplied")]
    MissingRuntimeParameter { parameter: String, property: String },

    #[error("Runtime parameter '{parameter}' has value '{raw}', which is not a valid {expected}")]
    InvalidRuntimeParameter {
        parameter: String,
        raw: String,
        expected: String,
    },

    #[error("Property '{property}' is not a valid {expected}: {message}")]
    InvalidPropertyValue {
        property: String,
        expected: String,
        message: String,
    },

    #[error("No block executor registered for block type '{0}'")]
    UnknownBlockType(String),

    #[error("Unknown constraint '{0}'")]
    UnknownConstraint(String),

    #[error("No constraint executor registered for constraint kind '{0}'")]
    UnknownConstraintKind(String),

    #[error("Unknown transform '{0}'")]
    UnknownTransform(String),

    #[error("Block '{block}' expected {expected} but got {actual}")]
    IoTypeMismatch {
        block: String,
        expected: IoType,
        actual: IoType,
    },

    #[error(transparent)]
    ValueType(#[from] ValueTypeError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
