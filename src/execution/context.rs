//! Per-run execution context
//!
//! The context is the only channel through which blocks and constraints read
//! their property values. It also owns the diagnostic stack: every log line
//! is prefixed with the nodes currently being processed.

use std::fmt;

use crate::blocks::ExtensionRegistry;
use crate::data::IoValue;
use crate::diagnostics::Diagnostics;
use crate::expressions::{evaluate_expression, EvaluationContext};
use crate::model::{Block, ConstraintBody, ConstraintDefinition, Expr, Model, Pipeline, PropertyMap};
use crate::valuetypes::{parse_value_representation, InternalValue, TypeRegistry, ValueType};

use super::scope::ScopedContext;
use super::{DebugConfig, ExecutionError, LogLevel, Logger, PropertySpec, RuntimeParameterProvider};

/// Read-only services shared by every pipeline run of one invocation
#[derive(Clone, Copy)]
pub struct RunEnvironment<'a> {
    pub model: &'a Model,
    pub types: &'a TypeRegistry,
    pub extensions: &'a ExtensionRegistry,
    pub runtime_parameters: &'a RuntimeParameterProvider,
    pub debug: &'a DebugConfig,
}

/// Frame of the diagnostic stack
#[derive(Debug, Clone)]
pub enum StackNode<'a> {
    Pipeline(&'a Pipeline),
    Block(&'a Block),
    Constraint(&'a ConstraintDefinition),
    Property(String),
}

impl fmt::Display for StackNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackNode::Pipeline(pipeline) => f.write_str(&pipeline.name),
            StackNode::Block(block) => f.write_str(&block.name),
            StackNode::Constraint(constraint) => f.write_str(&constraint.name),
            StackNode::Property(name) => f.write_str(name),
        }
    }
}

pub struct ExecutionContext<'a> {
    pipeline: &'a Pipeline,
    env: RunEnvironment<'a>,
    logger: Box<dyn Logger>,
    stack: Vec<StackNode<'a>>,
}

impl<'a> ExecutionContext<'a> {
    /// Context bound to `pipeline`, with the pipeline as its root frame
    pub fn new(pipeline: &'a Pipeline, env: RunEnvironment<'a>, logger: Box<dyn Logger>) -> Self {
        Self {
            pipeline,
            env,
            logger,
            stack: vec![StackNode::Pipeline(pipeline)],
        }
    }

    pub fn pipeline(&self) -> &'a Pipeline {
        self.pipeline
    }

    pub fn model(&self) -> &'a Model {
        self.env.model
    }

    pub fn types(&self) -> &'a TypeRegistry {
        self.env.types
    }

    pub fn extensions(&self) -> &'a ExtensionRegistry {
        self.env.extensions
    }

    pub fn debug_config(&self) -> &'a DebugConfig {
        self.env.debug
    }

    /* ===================== Stack ===================== */

    /// Push `node`; it is popped when the returned guard drops
    pub fn enter_node(&mut self, node: StackNode<'a>) -> ScopedContext<'_, 'a> {
        self.push_node(node);
        ScopedContext::new(self)
    }

    pub fn push_node(&mut self, node: StackNode<'a>) {
        self.stack.push(node);
    }

    pub fn exit_node(&mut self) -> Option<StackNode<'a>> {
        self.stack.pop()
    }

    pub fn stack(&self) -> &[StackNode<'a>] {
        &self.stack
    }

    /// `pipeline > block > property`
    pub fn location(&self) -> String {
        self.stack
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" > ")
    }

    pub fn current_block(&self) -> Option<&'a Block> {
        self.stack.iter().rev().find_map(|node| match node {
            StackNode::Block(block) => Some(*block),
            _ => None,
        })
    }

    /* ===================== Logging ===================== */

    pub fn log_info(&mut self, message: impl AsRef<str>) {
        let location = self.location();
        self.logger
            .log(LogLevel::Info, &location, message.as_ref(), None);
    }

    pub fn log_error(&mut self, message: impl AsRef<str>, hint: Option<&str>) {
        let location = self.location();
        self.logger
            .log(LogLevel::Error, &location, message.as_ref(), hint);
    }

    /// Only emitted when debugging is on and the current block is targeted
    pub fn log_debug(&mut self, message: impl AsRef<str>) {
        if !self.is_debug_target() {
            return;
        }
        let location = self.location();
        self.logger
            .log(LogLevel::Debug, &location, message.as_ref(), None);
    }

    /// Summary of a block output, plus a preview at full granularity
    pub fn log_debug_value(&mut self, value: &IoValue) {
        if !self.is_debug_target() {
            return;
        }
        self.log_debug(format!("Produced {}", value.summary()));
        for line in value.preview(self.env.debug.preview_rows()) {
            self.log_debug(format!("  {}", line));
        }
    }

    pub fn is_debug_target(&self) -> bool {
        match self.current_block() {
            Some(block) => self.env.debug.is_enabled_for(&block.name),
            None => self.env.debug.enabled,
        }
    }

    /* ===================== Properties ===================== */

    /// Resolve a property of the innermost block or constraint.
    ///
    /// Literal values are evaluated, runtime-parameter references are parsed
    /// against `valuetype`, and absent properties fall back to the declared
    /// default.
    pub fn get_property_value(
        &mut self,
        name: &str,
        valuetype: &ValueType,
    ) -> Result<InternalValue, ExecutionError> {
        self.get_optional_property_value(name, valuetype)?
            .ok_or_else(|| ExecutionError::MissingProperty {
                property: name.to_string(),
            })
    }

    /// Like [`get_property_value`](Self::get_property_value), but absent
    /// without a default is `Ok(None)`
    pub fn get_optional_property_value(
        &mut self,
        name: &str,
        valuetype: &ValueType,
    ) -> Result<Option<InternalValue>, ExecutionError> {
        let (properties, spec) = self.property_owner();
        let default = spec.and_then(|specs| {
            specs
                .iter()
                .find(|spec| spec.name == name)
                .and_then(|spec| spec.default_value.clone())
        });

        let Some(expr) = properties.and_then(|props| props.get(name)) else {
            return Ok(default);
        };

        let mut scoped = self.enter_node(StackNode::Property(name.to_string()));
        let value = scoped.resolve_expression(name, expr, valuetype)?;
        scoped.log_debug(format!("Resolved to {}", value));
        Ok(Some(value))
    }

    fn resolve_expression(
        &self,
        property: &str,
        expr: &Expr,
        valuetype: &ValueType,
    ) -> Result<InternalValue, ExecutionError> {
        if let Expr::RuntimeParameter { name, .. } = expr {
            let raw = self
                .env
                .runtime_parameters
                .get_raw_value(name)
                .ok_or_else(|| ExecutionError::MissingRuntimeParameter {
                    parameter: name.clone(),
                    property: property.to_string(),
                })?;
            return parse_value_representation(raw, valuetype).ok_or_else(|| {
                ExecutionError::InvalidRuntimeParameter {
                    parameter: name.clone(),
                    raw: raw.to_string(),
                    expected: valuetype.to_string(),
                }
            });
        }

        let mut diagnostics = Diagnostics::new();
        let value = evaluate_expression(expr, &self.evaluation_context(), &mut diagnostics);
        match value {
            Some(value) if valuetype.is_internal_value_representation(&value) => {
                Ok(widen(value, valuetype))
            }
            Some(value) => Err(ExecutionError::InvalidPropertyValue {
                property: property.to_string(),
                expected: valuetype.to_string(),
                message: format!("got {} '{}'", value.kind_name(), value),
            }),
            None => Err(ExecutionError::InvalidPropertyValue {
                property: property.to_string(),
                expected: valuetype.to_string(),
                message: diagnostics
                    .iter()
                    .map(|d| d.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            }),
        }
    }

    /// Properties and specs of the innermost frame that has properties
    fn property_owner(&self) -> (Option<&'a PropertyMap>, Option<&'a [PropertySpec]>) {
        for node in self.stack.iter().rev() {
            match node {
                StackNode::Block(block) => {
                    let specs = self
                        .env
                        .extensions
                        .blocks
                        .get(&block.block_type)
                        .map(|class| class.property_specs.as_slice());
                    return (Some(&block.properties), specs);
                }
                StackNode::Constraint(constraint) => {
                    return match &constraint.body {
                        ConstraintBody::Typed { kind, properties } => {
                            let specs = self
                                .env
                                .extensions
                                .constraints
                                .get(kind)
                                .map(|executor| executor.property_specs());
                            (Some(properties), specs)
                        }
                        ConstraintBody::Expression { .. } => (None, None),
                    };
                }
                StackNode::Pipeline(_) | StackNode::Property(_) => {}
            }
        }
        (None, None)
    }

    pub fn evaluation_context(&self) -> EvaluationContext<'a> {
        EvaluationContext::new(self.env.types)
    }
}

/// Integers stored where a decimal is declared become decimals
fn widen(value: InternalValue, valuetype: &ValueType) -> InternalValue {
    match (value, valuetype.primitive_root()) {
        (InternalValue::Integer(i), Ok(ValueType::Decimal)) => InternalValue::Decimal(i as f64),
        (InternalValue::Collection(items), Ok(ValueType::Collection(element))) => {
            InternalValue::Collection(items.into_iter().map(|item| widen(item, element)).collect())
        }
        (value, _) => value,
    }
}
