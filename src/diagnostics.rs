//! Validation diagnostics
//!
//! Validation errors are collected, never thrown: evaluation and checking keep
//! going so that every problem in a model is reported in one pass.

use crate::model::Span;

/// A validation error produced while checking or evaluating a model.
///
/// Independent of any output format so both the CLI and the execution
/// context can render it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The source location of the issue
    pub span: Span,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Which rule or evaluator produced this error
    pub rule_id: &'static str,
}

/// Severity levels for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Must be fixed - the model cannot run
    Error,
    /// Should probably be fixed
    Warning,
}

impl ValidationError {
    pub fn error(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Error,
            rule_id,
        }
    }

    pub fn warning(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Warning,
            rule_id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{} at {}: {} [{}]", severity, self.span, self.message, self.rule_id)
    }
}

/// Sink collecting diagnostics in report order
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<ValidationError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: ValidationError) {
        self.entries.push(diagnostic);
    }

    pub fn error(&mut self, span: Span, message: impl Into<String>, rule_id: &'static str) {
        self.push(ValidationError::error(span, message, rule_id));
    }

    pub fn warning(&mut self, span: Span, message: impl Into<String>, rule_id: &'static str) {
        self.push(ValidationError::warning(span, message, rule_id));
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = ValidationError>) {
        self.entries.extend(other);
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(ValidationError::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.entries.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.entries.iter().filter(|e| e.is_error())
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.entries
    }
}

impl IntoIterator for Diagnostics {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
