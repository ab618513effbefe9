//! Runtime values held by properties, expressions and table cells

use std::fmt;

use regex::Regex;

use super::ValueType;
use crate::data::CellRange;

/// Internal representation of a value of some [`ValueType`]
#[derive(Debug, Clone, PartialEq)]
pub enum InternalValue {
    Boolean(bool),
    Decimal(f64),
    Integer(i64),
    Text(String),
    Collection(Vec<InternalValue>),
    Regex(RegexValue),
    CellRange(CellRange),
    /// Name of a constraint definition
    Constraint(String),
    /// Name of a transform definition
    Transform(String),
    ValuetypeAssignment(ValuetypeAssignment),
}

impl InternalValue {
    pub fn text(value: impl Into<String>) -> Self {
        InternalValue::Text(value.into())
    }

    /// Numeric view used by arithmetic and comparisons
    pub fn as_number(&self) -> Option<f64> {
        match self {
            InternalValue::Decimal(d) => Some(*d),
            InternalValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            InternalValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InternalValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[InternalValue]> {
        match self {
            InternalValue::Collection(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, InternalValue::Decimal(_) | InternalValue::Integer(_))
    }

    /// Short kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            InternalValue::Boolean(_) => "boolean",
            InternalValue::Decimal(_) => "decimal",
            InternalValue::Integer(_) => "integer",
            InternalValue::Text(_) => "text",
            InternalValue::Collection(_) => "collection",
            InternalValue::Regex(_) => "regex",
            InternalValue::CellRange(_) => "cell range",
            InternalValue::Constraint(_) => "constraint",
            InternalValue::Transform(_) => "transform",
            InternalValue::ValuetypeAssignment(_) => "valuetype assignment",
        }
    }

    /// Canonical display form, also used by `asText`
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InternalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternalValue::Boolean(b) => write!(f, "{}", b),
            InternalValue::Decimal(d) => write!(f, "{}", d),
            InternalValue::Integer(i) => write!(f, "{}", i),
            InternalValue::Text(s) => f.write_str(s),
            InternalValue::Collection(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            InternalValue::Regex(r) => write!(f, "/{}/", r.pattern()),
            InternalValue::CellRange(range) => write!(f, "{}", range),
            InternalValue::Constraint(name) | InternalValue::Transform(name) => f.write_str(name),
            InternalValue::ValuetypeAssignment(a) => {
                write!(f, "\"{}\" oftype {}", a.name, a.valuetype)
            }
        }
    }
}

/// Compiled regular expression; equality is by source pattern
#[derive(Debug, Clone)]
pub struct RegexValue {
    regex: Regex,
}

impl RegexValue {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for RegexValue {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern()
    }
}

/// Column declaration `"name" oftype T` used by table interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct ValuetypeAssignment {
    pub name: String,
    pub valuetype: ValueType,
}
