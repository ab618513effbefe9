//! # Block executors
//!
//! A block executor turns one input value into one output value. Each block
//! type is described by a [`BlockExecutorClass`]: its name, the IO types it
//! consumes and produces, its properties, and a factory creating one fresh
//! executor per block occurrence.
//!
//! ## Outcomes
//!
//! - `Ok(BlockOutcome::Produced(value))`: success, `value` flows downstream
//! - `Ok(BlockOutcome::HandledFailure)`: already logged; successors are skipped
//! - `Err(ExecutionError)`: fatal; the interpreter run aborts

mod registry;
pub mod stdlib;

use async_trait::async_trait;

use crate::data::{IoType, IoValue};
use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};

pub use registry::{BlockExecutorRegistry, ExtensionRegistry, RegistryError};

#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Produced(IoValue),
    HandledFailure,
}

#[async_trait]
pub trait BlockExecutor: Send + Sync {
    async fn execute(
        &self,
        input: IoValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<BlockOutcome, ExecutionError>;
}

#[derive(Debug)]
pub struct BlockExecutorClass {
    pub block_type: &'static str,
    pub input_type: IoType,
    pub output_type: IoType,
    pub property_specs: Vec<PropertySpec>,
    pub factory: fn() -> Box<dyn BlockExecutor>,
}

impl BlockExecutorClass {
    pub fn property_spec(&self, name: &str) -> Option<&PropertySpec> {
        self.property_specs.iter().find(|spec| spec.name == name)
    }

    pub fn instantiate(&self) -> Box<dyn BlockExecutor> {
        (self.factory)()
    }
}
