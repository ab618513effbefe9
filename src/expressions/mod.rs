//! # Expression evaluation
//!
//! Evaluates [`Expr`] trees to [`InternalValue`]s. Evaluation never panics
//! and never aborts: every failure is reported into the [`Diagnostics`] sink
//! and the affected subexpression yields `None`. Sibling operands are still
//! evaluated so that one pass reports every problem in an expression.
//!
//! Operator semantics live in [`operators`]; static result types in
//! [`typing`].

pub mod operators;
pub mod typing;

use std::collections::HashMap;

use crate::data::CellRange;
use crate::diagnostics::Diagnostics;
use crate::model::{BinaryOperator, Expr};
use crate::valuetypes::{InternalValue, RegexValue, TypeRegistry, ValuetypeAssignment};

pub use operators::{values_equal, OperandGuard};
pub use typing::{infer_expression_type, TypeEnv};

use operators::{check_operand, evaluate_binary, evaluate_ternary, evaluate_unary, RULE_ID};

/// Bindings visible to an expression
#[derive(Debug, Clone)]
pub struct EvaluationContext<'a> {
    variables: HashMap<String, InternalValue>,
    value: Option<InternalValue>,
    types: &'a TypeRegistry,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(types: &'a TypeRegistry) -> Self {
        Self {
            variables: HashMap::new(),
            value: None,
            types,
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: InternalValue) -> Self {
        self.bind(name, value);
        self
    }

    /// Bind the `value` keyword, as done for expression constraints
    pub fn with_value_keyword(mut self, value: InternalValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn bind(&mut self, name: impl Into<String>, value: InternalValue) {
        self.variables.insert(name.into(), value);
    }

    pub fn variable(&self, name: &str) -> Option<&InternalValue> {
        self.variables.get(name)
    }

    pub fn value_keyword(&self) -> Option<&InternalValue> {
        self.value.as_ref()
    }

    pub fn types(&self) -> &TypeRegistry {
        self.types
    }
}

/// Evaluate `expr`, reporting failures into `diagnostics`.
///
/// `None` always comes with at least one new diagnostic.
pub fn evaluate_expression(
    expr: &Expr,
    ctx: &EvaluationContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<InternalValue> {
    match expr {
        Expr::Boolean { value, .. } => Some(InternalValue::Boolean(*value)),
        Expr::Decimal { value, .. } => Some(InternalValue::Decimal(*value)),
        Expr::Integer { value, .. } => Some(InternalValue::Integer(*value)),
        Expr::Text { value, .. } => Some(InternalValue::Text(value.clone())),

        Expr::Regex { pattern, span } => match RegexValue::new(pattern) {
            Ok(regex) => Some(InternalValue::Regex(regex)),
            Err(e) => {
                diagnostics.error(*span, format!("Invalid regex '{}': {}", pattern, e), RULE_ID);
                None
            }
        },

        Expr::CellRange { selector, span } => match CellRange::parse(selector) {
            Ok(range) => Some(InternalValue::CellRange(range)),
            Err(e) => {
                diagnostics.error(*span, e.to_string(), RULE_ID);
                None
            }
        },

        Expr::Collection { elements, .. } => {
            // Evaluate every element before giving up so all errors surface
            let values: Vec<Option<InternalValue>> = elements
                .iter()
                .map(|element| evaluate_expression(element, ctx, diagnostics))
                .collect();
            values
                .into_iter()
                .collect::<Option<Vec<_>>>()
                .map(InternalValue::Collection)
        }

        Expr::ValuetypeAssignment {
            name,
            valuetype,
            span,
        } => match ctx.types.resolve(valuetype) {
            Some(resolved) => Some(InternalValue::ValuetypeAssignment(ValuetypeAssignment {
                name: name.clone(),
                valuetype: resolved,
            })),
            None => {
                diagnostics.error(
                    *span,
                    format!("Unknown value type '{}' for column '{}'", valuetype, name),
                    RULE_ID,
                );
                None
            }
        },

        Expr::ConstraintRef { name, .. } => Some(InternalValue::Constraint(name.clone())),
        Expr::TransformRef { name, .. } => Some(InternalValue::Transform(name.clone())),

        Expr::RuntimeParameter { name, span } => {
            diagnostics.error(
                *span,
                format!(
                    "Runtime parameter '{}' can only be used as a whole property value",
                    name
                ),
                RULE_ID,
            );
            None
        }

        Expr::Variable { name, span } => match ctx.variable(name) {
            Some(value) => Some(value.clone()),
            None => {
                diagnostics.error(*span, format!("Unknown variable '{}'", name), RULE_ID);
                None
            }
        },

        Expr::ValueKeyword { span } => match ctx.value_keyword() {
            Some(value) => Some(value.clone()),
            None => {
                diagnostics.error(
                    *span,
                    "The 'value' keyword is only available inside constraint expressions",
                    RULE_ID,
                );
                None
            }
        },

        Expr::Unary {
            operator,
            operand,
            span,
        } => {
            let operand = evaluate_expression(operand, ctx, diagnostics)?;
            evaluate_unary(*operator, &operand, *span, diagnostics)
        }

        Expr::Binary {
            operator: operator @ (BinaryOperator::And | BinaryOperator::Or),
            left,
            right,
            span,
        } => {
            let left = evaluate_expression(left, ctx, diagnostics)?;
            if !check_operand(
                operators::OperandGuard::Boolean,
                &left,
                operator.token(),
                "Left",
                *span,
                diagnostics,
            ) {
                return None;
            }
            match (operator, left.as_bool()) {
                (BinaryOperator::And, Some(false)) => return Some(InternalValue::Boolean(false)),
                (BinaryOperator::Or, Some(true)) => return Some(InternalValue::Boolean(true)),
                _ => {}
            }
            let right = evaluate_expression(right, ctx, diagnostics)?;
            evaluate_binary(*operator, &left, &right, *span, diagnostics)
        }

        Expr::Binary {
            operator,
            left,
            right,
            span,
        } => {
            let left = evaluate_expression(left, ctx, diagnostics);
            let right = evaluate_expression(right, ctx, diagnostics);
            evaluate_binary(*operator, &left?, &right?, *span, diagnostics)
        }

        Expr::Ternary {
            operator,
            first,
            second,
            third,
            span,
        } => {
            let first = evaluate_expression(first, ctx, diagnostics);
            let second = evaluate_expression(second, ctx, diagnostics);
            let third = evaluate_expression(third, ctx, diagnostics);
            evaluate_ternary(*operator, &first?, &second?, &third?, *span, diagnostics)
        }
    }
}

#[cfg(test)]
mod tests;
