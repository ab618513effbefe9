//! # Value types
//!
//! The closed set of type descriptors a property, transform port or table
//! column can declare.
//!
//! ## Dispatch
//!
//! [`ValueType`] is an enum with one variant per kind. Every consumer that
//! behaves differently per kind either matches on it directly (see
//! [`parse::parse_value_representation`]) or implements [`ValueTypeVisitor`]
//! and goes through [`ValueType::accept_visitor`], which is the single
//! exhaustive match invoking exactly one `visit_*` method. Visitors only
//! implement the primitive kinds; every structural kind fails with
//! [`ValueTypeError::UnsupportedKind`] unless the visitor opts in.
//!
//! Primitive variants carry no state, so two `ValueType::Text` descriptors are
//! always equal, which gives the same guarantees as process-wide singletons.

pub mod parse;
pub mod registry;
pub mod sql;
mod values;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

pub use parse::parse_value_representation;
pub use registry::TypeRegistry;
pub use values::{InternalValue, RegexValue, ValuetypeAssignment};

/* ===================== Types ===================== */

#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    Boolean,
    Decimal,
    Integer,
    Text,
    Collection(Box<ValueType>),
    /// Type of the empty collection literal, unifies with every collection
    EmptyCollection,
    Atomic(Arc<AtomicValueType>),
    Regex,
    CellRange,
    Constraint,
    Transform,
    ValuetypeAssignment,
}

/// User-defined type: a supertype narrowed by constraints
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicValueType {
    pub name: String,
    /// `None` only for malformed registries; resolving it is a bug, not a user error
    pub supertype: Option<ValueType>,
    /// Constraint definition names, checked in order
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTypeKind {
    Boolean,
    Decimal,
    Integer,
    Text,
    Collection,
    EmptyCollection,
    Atomic,
    Regex,
    CellRange,
    Constraint,
    Transform,
    ValuetypeAssignment,
}

impl fmt::Display for ValueTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueTypeKind::Boolean => "boolean",
            ValueTypeKind::Decimal => "decimal",
            ValueTypeKind::Integer => "integer",
            ValueTypeKind::Text => "text",
            ValueTypeKind::Collection => "collection",
            ValueTypeKind::EmptyCollection => "empty collection",
            ValueTypeKind::Atomic => "atomic",
            ValueTypeKind::Regex => "regex",
            ValueTypeKind::CellRange => "cell range",
            ValueTypeKind::Constraint => "constraint",
            ValueTypeKind::Transform => "transform",
            ValueTypeKind::ValuetypeAssignment => "valuetype assignment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueTypeError {
    #[error("{visitor} does not support value type kind '{kind}'")]
    UnsupportedKind {
        visitor: &'static str,
        kind: ValueTypeKind,
    },
    #[error("atomic value type '{0}' has no supertype")]
    MissingSupertype(String),
}

/* ===================== Visitor ===================== */

/// Per-kind behavior, dispatched by [`ValueType::accept_visitor`]
pub trait ValueTypeVisitor {
    type Output;

    /// Name reported in [`ValueTypeError::UnsupportedKind`]
    fn visitor_name(&self) -> &'static str;

    fn visit_boolean(&mut self) -> Result<Self::Output, ValueTypeError>;
    fn visit_decimal(&mut self) -> Result<Self::Output, ValueTypeError>;
    fn visit_integer(&mut self) -> Result<Self::Output, ValueTypeError>;
    fn visit_text(&mut self) -> Result<Self::Output, ValueTypeError>;

    /// Atomic types behave like the root of their supertype chain
    fn visit_atomic(&mut self, atomic: &AtomicValueType) -> Result<Self::Output, ValueTypeError>
    where
        Self: Sized,
    {
        let supertype = atomic
            .supertype
            .as_ref()
            .ok_or_else(|| ValueTypeError::MissingSupertype(atomic.name.clone()))?;
        supertype.accept_visitor(self)
    }

    fn visit_collection(&mut self, _element: &ValueType) -> Result<Self::Output, ValueTypeError> {
        Err(self.unsupported(ValueTypeKind::Collection))
    }

    fn visit_empty_collection(&mut self) -> Result<Self::Output, ValueTypeError> {
        Err(self.unsupported(ValueTypeKind::EmptyCollection))
    }

    fn visit_regex(&mut self) -> Result<Self::Output, ValueTypeError> {
        Err(self.unsupported(ValueTypeKind::Regex))
    }

    fn visit_cell_range(&mut self) -> Result<Self::Output, ValueTypeError> {
        Err(self.unsupported(ValueTypeKind::CellRange))
    }

    fn visit_constraint(&mut self) -> Result<Self::Output, ValueTypeError> {
        Err(self.unsupported(ValueTypeKind::Constraint))
    }

    fn visit_transform(&mut self) -> Result<Self::Output, ValueTypeError> {
        Err(self.unsupported(ValueTypeKind::Transform))
    }

    fn visit_valuetype_assignment(&mut self) -> Result<Self::Output, ValueTypeError> {
        Err(self.unsupported(ValueTypeKind::ValuetypeAssignment))
    }

    fn unsupported(&self, kind: ValueTypeKind) -> ValueTypeError {
        ValueTypeError::UnsupportedKind {
            visitor: self.visitor_name(),
            kind,
        }
    }
}

/* ===================== ValueType ===================== */

impl ValueType {
    pub fn collection(element: ValueType) -> Self {
        ValueType::Collection(Box::new(element))
    }

    pub fn atomic(
        name: impl Into<String>,
        supertype: ValueType,
        constraints: Vec<String>,
    ) -> Self {
        ValueType::Atomic(Arc::new(AtomicValueType {
            name: name.into(),
            supertype: Some(supertype),
            constraints,
        }))
    }

    pub fn kind(&self) -> ValueTypeKind {
        match self {
            ValueType::Boolean => ValueTypeKind::Boolean,
            ValueType::Decimal => ValueTypeKind::Decimal,
            ValueType::Integer => ValueTypeKind::Integer,
            ValueType::Text => ValueTypeKind::Text,
            ValueType::Collection(_) => ValueTypeKind::Collection,
            ValueType::EmptyCollection => ValueTypeKind::EmptyCollection,
            ValueType::Atomic(_) => ValueTypeKind::Atomic,
            ValueType::Regex => ValueTypeKind::Regex,
            ValueType::CellRange => ValueTypeKind::CellRange,
            ValueType::Constraint => ValueTypeKind::Constraint,
            ValueType::Transform => ValueTypeKind::Transform,
            ValueType::ValuetypeAssignment => ValueTypeKind::ValuetypeAssignment,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            ValueType::Boolean | ValueType::Decimal | ValueType::Integer | ValueType::Text
        )
    }

    /// Invoke exactly the visit method matching this type's kind
    pub fn accept_visitor<V: ValueTypeVisitor>(
        &self,
        visitor: &mut V,
    ) -> Result<V::Output, ValueTypeError> {
        match self {
            ValueType::Boolean => visitor.visit_boolean(),
            ValueType::Decimal => visitor.visit_decimal(),
            ValueType::Integer => visitor.visit_integer(),
            ValueType::Text => visitor.visit_text(),
            ValueType::Collection(element) => visitor.visit_collection(element),
            ValueType::EmptyCollection => visitor.visit_empty_collection(),
            ValueType::Atomic(atomic) => visitor.visit_atomic(atomic),
            ValueType::Regex => visitor.visit_regex(),
            ValueType::CellRange => visitor.visit_cell_range(),
            ValueType::Constraint => visitor.visit_constraint(),
            ValueType::Transform => visitor.visit_transform(),
            ValueType::ValuetypeAssignment => visitor.visit_valuetype_assignment(),
        }
    }

    /// Follow the supertype chain of atomic types to the first non-atomic type
    pub fn primitive_root(&self) -> Result<&ValueType, ValueTypeError> {
        let mut current = self;
        while let ValueType::Atomic(atomic) = current {
            current = atomic
                .supertype
                .as_ref()
                .ok_or_else(|| ValueTypeError::MissingSupertype(atomic.name.clone()))?;
        }
        Ok(current)
    }

    /// Atomic types from this one up to (excluding) the primitive root
    pub fn atomic_chain(&self) -> Vec<&AtomicValueType> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(ValueType::Atomic(atomic)) = current {
            chain.push(atomic.as_ref());
            current = atomic.supertype.as_ref();
        }
        chain
    }

    /// Structural validity; constraints are checked by the constraints module
    pub fn is_internal_value_representation(&self, value: &InternalValue) -> bool {
        match (self, value) {
            (ValueType::Boolean, InternalValue::Boolean(_)) => true,
            (ValueType::Decimal, InternalValue::Decimal(_) | InternalValue::Integer(_)) => true,
            (ValueType::Integer, InternalValue::Integer(_)) => true,
            (ValueType::Text, InternalValue::Text(_)) => true,
            (ValueType::Collection(element), InternalValue::Collection(items)) => items
                .iter()
                .all(|item| element.is_internal_value_representation(item)),
            (ValueType::EmptyCollection, InternalValue::Collection(items)) => items.is_empty(),
            (ValueType::Atomic(atomic), _) => atomic
                .supertype
                .as_ref()
                .is_some_and(|supertype| supertype.is_internal_value_representation(value)),
            (ValueType::Regex, InternalValue::Regex(_)) => true,
            (ValueType::CellRange, InternalValue::CellRange(_)) => true,
            (ValueType::Constraint, InternalValue::Constraint(_)) => true,
            (ValueType::Transform, InternalValue::Transform(_)) => true,
            (ValueType::ValuetypeAssignment, InternalValue::ValuetypeAssignment(_)) => true,
            _ => false,
        }
    }

    /// Whether a value of `self` can be used where `target` is expected
    pub fn is_convertible_to(&self, target: &ValueType) -> bool {
        if self == target {
            return true;
        }
        match (self, target) {
            (ValueType::Integer, ValueType::Decimal) => true,
            (ValueType::EmptyCollection, ValueType::Collection(_)) => true,
            (ValueType::Collection(from), ValueType::Collection(to)) => from.is_convertible_to(to),
            (ValueType::Atomic(atomic), _) => atomic
                .supertype
                .as_ref()
                .is_some_and(|supertype| supertype.is_convertible_to(target)),
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Boolean => f.write_str("boolean"),
            ValueType::Decimal => f.write_str("decimal"),
            ValueType::Integer => f.write_str("integer"),
            ValueType::Text => f.write_str("text"),
            ValueType::Collection(element) => write!(f, "Collection<{}>", element),
            ValueType::EmptyCollection => f.write_str("Collection<>"),
            ValueType::Atomic(atomic) => f.write_str(&atomic.name),
            ValueType::Regex => f.write_str("Regex"),
            ValueType::CellRange => f.write_str("CellRange"),
            ValueType::Constraint => f.write_str("Constraint"),
            ValueType::Transform => f.write_str("Transform"),
            ValueType::ValuetypeAssignment => f.write_str("ValuetypeAssignment"),
        }
    }
}
