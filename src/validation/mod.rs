//! Model validation before execution
//!
//! Rule-based checks that catch model errors the resolver cannot: unknown
//! block types, property problems, pipe structure, transform and value type
//! consistency. Every rule runs and every problem is reported; execution
//! only starts when no error was found.
//!
//! # Adding a New Rule
//!
//! 1. Create a new file in `validation/rules/`
//! 2. Implement `ValidationRule` for your struct
//! 3. Add it to the `Validator::new()` constructor

mod properties;
pub mod rules;

use crate::blocks::ExtensionRegistry;
use crate::diagnostics::{Diagnostics, ValidationError};
use crate::execution::RuntimeParameterProvider;
use crate::model::Model;
use crate::valuetypes::TypeRegistry;

pub(crate) use properties::check_properties;

/// Everything a rule may look at
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub model: &'a Model,
    pub types: &'a TypeRegistry,
    pub extensions: &'a ExtensionRegistry,
    pub runtime_parameters: &'a RuntimeParameterProvider,
}

/// Trait that all validation rules must implement.
///
/// Rules are independent of each other's results.
pub trait ValidationRule: Send + Sync {
    /// Unique identifier for this rule (e.g., "pipe-structure")
    fn id(&self) -> &'static str;

    /// Human-readable description of what this rule checks
    fn description(&self) -> &'static str;

    /// Every problem found; empty means the model passes this rule
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationError>;
}

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(rules::UnknownBlockTypeRule),
                Box::new(rules::BlockPropertiesRule),
                Box::new(rules::RuntimeParametersRule),
                Box::new(rules::PipeStructureRule),
                Box::new(rules::TransformTypesRule),
                Box::new(rules::ValuetypeDefinitionsRule),
                Box::new(rules::ConstraintDefinitionsRule),
            ],
        }
    }

    pub fn validate(&self, ctx: &ValidationContext<'_>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for rule in &self.rules {
            diagnostics.extend(rule.validate(ctx));
        }
        diagnostics
    }

    /// `(id, description)` of every registered rule
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.id(), r.description()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the model's value types and run every rule.
///
/// Value type resolution problems are part of the returned diagnostics.
pub fn check_model(
    model: &Model,
    extensions: &ExtensionRegistry,
    runtime_parameters: &RuntimeParameterProvider,
) -> (TypeRegistry, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let types = TypeRegistry::from_model(model, &mut diagnostics);
    let ctx = ValidationContext {
        model,
        types: &types,
        extensions,
        runtime_parameters,
    };
    diagnostics.extend(Validator::new().validate(&ctx));
    (types, diagnostics)
}

#[cfg(test)]
mod tests;
