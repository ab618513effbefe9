//! Fixtures shared by unit tests

use crate::blocks::ExtensionRegistry;
use crate::diagnostics::Diagnostics;
use crate::execution::{
    DebugConfig, DebugGranularity, DebugTargets, ExecutionContext, MemoryLogger, RunEnvironment,
    RuntimeParameterProvider, StackNode,
};
use crate::model::{
    Block, ConstraintBody, ConstraintDefinition, Expr, Model, Pipe, Pipeline, PropertyMap, Span,
    TypeRef, ValuetypeDefinition,
};
use crate::valuetypes::TypeRegistry;

/// Everything an [`ExecutionContext`] borrows, owned in one place
pub struct TestEnv {
    pub model: Model,
    pub types: TypeRegistry,
    pub extensions: ExtensionRegistry,
    pub params: RuntimeParameterProvider,
    pub debug: DebugConfig,
    pub logger: MemoryLogger,
    pipeline: Pipeline,
}

impl TestEnv {
    pub fn new(model: Model) -> Self {
        let mut diagnostics = Diagnostics::new();
        let types = TypeRegistry::from_model(&model, &mut diagnostics);
        assert!(!diagnostics.has_errors(), "fixture model has errors: {:?}", diagnostics);
        Self {
            model,
            types,
            extensions: ExtensionRegistry::std().unwrap(),
            params: RuntimeParameterProvider::new(),
            debug: DebugConfig::disabled(),
            logger: MemoryLogger::new(),
            pipeline: pipeline("TestPipeline", vec![], &[]),
        }
    }

    pub fn empty() -> Self {
        Self::new(Model::default())
    }

    pub fn with_params(mut self, assignments: &[&str]) -> Self {
        self.params = RuntimeParameterProvider::from_assignments(
            assignments.iter().map(|a| a.to_string()),
        )
        .unwrap();
        self
    }

    pub fn with_full_debug(mut self) -> Self {
        self.debug = DebugConfig {
            enabled: true,
            granularity: DebugGranularity::Full,
            targets: DebugTargets::All,
        };
        self
    }

    pub fn env(&self) -> RunEnvironment<'_> {
        RunEnvironment {
            model: &self.model,
            types: &self.types,
            extensions: &self.extensions,
            runtime_parameters: &self.params,
            debug: &self.debug,
        }
    }

    /// Context whose only frame is a placeholder pipeline
    pub fn context(&self) -> ExecutionContext<'_> {
        ExecutionContext::new(&self.pipeline, self.env(), Box::new(self.logger.clone()))
    }

    /// Context positioned inside `block`
    pub fn block_context<'s>(&'s self, block: &'s Block) -> ExecutionContext<'s> {
        let mut ctx = self.context();
        ctx.push_node(StackNode::Block(block));
        ctx
    }
}

pub fn block(name: &str, block_type: &str, properties: PropertyMap) -> Block {
    Block {
        name: name.to_string(),
        block_type: block_type.to_string(),
        properties,
        span: Span::default(),
    }
}

pub fn pipeline(name: &str, blocks: Vec<Block>, pipes: &[(&str, &str)]) -> Pipeline {
    Pipeline {
        name: name.to_string(),
        blocks,
        pipes: pipes
            .iter()
            .map(|(from, to)| Pipe {
                from: from.to_string(),
                to: to.to_string(),
                span: Span::default(),
            })
            .collect(),
        span: Span::default(),
    }
}

pub fn text_list(items: &[&str]) -> Expr {
    Expr::collection(items.iter().map(|item| Expr::text(*item)).collect())
}

pub fn valuetype(name: &str, supertype: &str, constraints: &[&str]) -> ValuetypeDefinition {
    ValuetypeDefinition {
        name: name.to_string(),
        supertype: TypeRef::new(supertype),
        constraints: constraints.iter().map(|c| c.to_string()).collect(),
        span: Span::default(),
    }
}

pub fn typed_constraint(name: &str, on: &str, kind: &str, properties: PropertyMap) -> ConstraintDefinition {
    ConstraintDefinition {
        name: name.to_string(),
        on: TypeRef::new(on),
        body: ConstraintBody::Typed {
            kind: kind.to_string(),
            properties,
        },
        span: Span::default(),
    }
}

pub fn expression_constraint(name: &str, on: &str, expression: Expr) -> ConstraintDefinition {
    ConstraintDefinition {
        name: name.to_string(),
        on: TypeRef::new(on),
        body: ConstraintBody::Expression { expression },
        span: Span::default(),
    }
}
