//! # Execution context
//!
//! Everything a block or constraint sees while it runs: typed property
//! values (with runtime-parameter substitution), the diagnostic stack,
//! logging and debug controls.

mod context;
mod debug;
mod errors;
mod logger;
mod runtime_params;
mod scope;

pub use context::{ExecutionContext, RunEnvironment, StackNode};
pub use debug::{DebugConfig, DebugGranularity, DebugTargets};
pub use errors::ExecutionError;
pub use logger::{LogLevel, LogLine, Logger, MemoryLogger, TracingLogger};
pub use runtime_params::{RuntimeParameterError, RuntimeParameterProvider};
pub use scope::ScopedContext;

use crate::valuetypes::{InternalValue, ValueType};

/// Declared property of a block type or constraint kind
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub value_type: ValueType,
    pub default_value: Option<InternalValue>,
    /// May be absent even without a default
    pub optional: bool,
    pub docs: &'static str,
}

impl PropertySpec {
    pub fn required(name: &'static str, value_type: ValueType, docs: &'static str) -> Self {
        Self {
            name,
            value_type,
            default_value: None,
            optional: false,
            docs,
        }
    }

    pub fn optional(name: &'static str, value_type: ValueType, docs: &'static str) -> Self {
        Self {
            optional: true,
            ..Self::required(name, value_type, docs)
        }
    }

    pub fn with_default(
        name: &'static str,
        value_type: ValueType,
        default_value: InternalValue,
        docs: &'static str,
    ) -> Self {
        Self {
            name,
            value_type,
            default_value: Some(default_value),
            optional: false,
            docs,
        }
    }

    pub fn is_required(&self) -> bool {
        !self.optional && self.default_value.is_none()
    }
}
