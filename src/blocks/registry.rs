//! Block type name → executor class lookup
//!
//! Built once at startup from the extensions the interpreter was given.
//! Registering the same name twice is an error, never a silent override.

use std::collections::BTreeMap;

use thiserror::Error;

use super::{stdlib, BlockExecutorClass};
use crate::constraints::ConstraintRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Block type '{0}' is registered more than once")]
    DuplicateBlockType(String),
    #[error("Constraint kind '{0}' is registered more than once")]
    DuplicateConstraintKind(String),
}

#[derive(Debug, Default)]
pub struct BlockExecutorRegistry {
    classes: BTreeMap<&'static str, BlockExecutorClass>,
}

impl BlockExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class: BlockExecutorClass) -> Result<(), RegistryError> {
        if self.classes.contains_key(class.block_type) {
            return Err(RegistryError::DuplicateBlockType(class.block_type.to_string()));
        }
        self.classes.insert(class.block_type, class);
        Ok(())
    }

    pub fn register_all(
        &mut self,
        classes: impl IntoIterator<Item = BlockExecutorClass>,
    ) -> Result<(), RegistryError> {
        classes.into_iter().try_for_each(|class| self.register(class))
    }

    pub fn get(&self, block_type: &str) -> Option<&BlockExecutorClass> {
        self.classes.get(block_type)
    }

    pub fn classes(&self) -> impl Iterator<Item = &BlockExecutorClass> {
        self.classes.values()
    }
}

/// Everything the interpreter can execute: block types and constraint kinds
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    pub blocks: BlockExecutorRegistry,
    pub constraints: ConstraintRegistry,
}

impl ExtensionRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard library of block executors and constraint kinds
    pub fn std() -> Result<Self, RegistryError> {
        let mut blocks = BlockExecutorRegistry::new();
        blocks.register_all(stdlib::classes())?;
        Ok(Self {
            blocks,
            constraints: ConstraintRegistry::with_builtins()?,
        })
    }
}
