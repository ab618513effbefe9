//! # Constraints
//!
//! Named predicates over single values. Typed constraints are backed by a
//! [`ConstraintExecutor`] looked up by kind name in the [`ConstraintRegistry`];
//! expression constraints evaluate a boolean body with `value` bound.
//!
//! The registry is built once at startup and only read afterwards.

mod allowlist;
mod denylist;
mod expression;
mod length;
mod pattern;
mod range;

use std::collections::BTreeMap;

use crate::blocks::RegistryError;
use crate::execution::{ExecutionContext, ExecutionError, PropertySpec, StackNode};
use crate::model::ConstraintBody;
use crate::valuetypes::{InternalValue, ValueType};

pub use allowlist::AllowlistConstraint;
pub use denylist::DenylistConstraint;
pub use expression::is_valid_by_expression;
pub use length::LengthConstraint;
pub use pattern::RegexConstraint;
pub use range::RangeConstraint;

pub trait ConstraintExecutor: Send + Sync {
    /// Name used by typed constraint definitions, e.g. `Denylist`
    fn kind_name(&self) -> &'static str;

    fn property_specs(&self) -> &[PropertySpec];

    /// Whether `value` satisfies the constraint whose properties are
    /// readable through `ctx`
    fn is_valid(
        &self,
        value: &InternalValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<bool, ExecutionError>;
}

#[derive(Default)]
pub struct ConstraintRegistry {
    executors: BTreeMap<&'static str, Box<dyn ConstraintExecutor>>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in constraint kind
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(Box::new(DenylistConstraint::new()))?;
        registry.register(Box::new(AllowlistConstraint::new()))?;
        registry.register(Box::new(RegexConstraint::new()))?;
        registry.register(Box::new(LengthConstraint::new()))?;
        registry.register(Box::new(RangeConstraint::new()))?;
        Ok(registry)
    }

    pub fn register(&mut self, executor: Box<dyn ConstraintExecutor>) -> Result<(), RegistryError> {
        let kind = executor.kind_name();
        if self.executors.contains_key(kind) {
            return Err(RegistryError::DuplicateConstraintKind(kind.to_string()));
        }
        self.executors.insert(kind, executor);
        Ok(())
    }

    pub fn get(&self, kind: &str) -> Option<&dyn ConstraintExecutor> {
        self.executors.get(kind).map(|executor| executor.as_ref())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.executors.keys().copied()
    }
}

impl std::fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.executors.keys()).finish()
    }
}

/// Structural validity plus every constraint along the atomic chain.
///
/// Constraints of the supertype-most atomic type run first. The first
/// violated constraint ends the check.
pub fn is_value_valid(
    value: &InternalValue,
    valuetype: &ValueType,
    ctx: &mut ExecutionContext<'_>,
) -> Result<bool, ExecutionError> {
    // A broken supertype chain is a bug, not an invalid value
    valuetype.primitive_root()?;
    if !valuetype.is_internal_value_representation(value) {
        return Ok(false);
    }

    for atomic in valuetype.atomic_chain().iter().rev() {
        for constraint in &atomic.constraints {
            if !check_constraint(constraint, value, ctx)? {
                ctx.log_debug(format!(
                    "Value '{}' violates constraint '{}' of value type '{}'",
                    value, constraint, atomic.name
                ));
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Run one named constraint definition against `value`
pub fn check_constraint(
    name: &str,
    value: &InternalValue,
    ctx: &mut ExecutionContext<'_>,
) -> Result<bool, ExecutionError> {
    let definition = ctx
        .model()
        .constraint(name)
        .ok_or_else(|| ExecutionError::UnknownConstraint(name.to_string()))?;
    let extensions = ctx.extensions();

    let mut scoped = ctx.enter_node(StackNode::Constraint(definition));
    match &definition.body {
        ConstraintBody::Typed { kind, .. } => {
            let executor = extensions
                .constraints
                .get(kind)
                .ok_or_else(|| ExecutionError::UnknownConstraintKind(kind.clone()))?;
            executor.is_valid(value, &mut scoped)
        }
        ConstraintBody::Expression { expression } => {
            is_valid_by_expression(expression, value, &mut scoped)
        }
    }
}
