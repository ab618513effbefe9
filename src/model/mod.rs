//! Resolved model document
//!
//! Parsing and cross-reference resolution happen outside this crate. What
//! arrives here is the already-validated AST, serialized with serde (JSON, or
//! TOML when the file name ends in `.toml`).

pub mod expr;
mod loader;
mod span;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use expr::{BinaryOperator, Expr, TernaryOperator, UnaryOperator};
pub use loader::{load_model, parse_model, ModelError, ModelFormat};
pub use span::Span;

use span::is_default_span;

/// Property name → value expression
pub type PropertyMap = BTreeMap<String, Expr>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
    #[serde(default)]
    pub valuetypes: Vec<ValuetypeDefinition>,
    #[serde(default)]
    pub constraints: Vec<ConstraintDefinition>,
    #[serde(default)]
    pub transforms: Vec<TransformDefinition>,
}

impl Model {
    pub fn pipeline(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|p| p.name == name)
    }

    pub fn valuetype(&self, name: &str) -> Option<&ValuetypeDefinition> {
        self.valuetypes.iter().find(|v| v.name == name)
    }

    pub fn constraint(&self, name: &str) -> Option<&ConstraintDefinition> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn transform(&self, name: &str) -> Option<&TransformDefinition> {
        self.transforms.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub pipes: Vec<Pipe>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

impl Pipeline {
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/// Directed edge `from -> to` between two blocks of the same pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipe {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/// Reference to a value type by name, e.g. `text`, `Zip` or `Collection<integer>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(pub String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        TypeRef(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `valuetype Name oftype Supertype { constraints: [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuetypeDefinition {
    pub name: String,
    pub supertype: TypeRef,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    pub name: String,
    /// Primitive type the constraint applies to
    pub on: TypeRef,
    pub body: ConstraintBody,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ConstraintBody {
    /// Backed by a registered constraint executor
    Typed {
        kind: String,
        #[serde(default)]
        properties: PropertyMap,
    },
    /// Boolean expression over the `value` keyword
    Expression { expression: Expr },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformDefinition {
    pub name: String,
    pub inputs: Vec<TransformPort>,
    pub output: TypeRef,
    pub body: Expr,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformPort {
    pub name: String,
    pub valuetype: TypeRef,
}
