//! Static result types of expressions
//!
//! Mirrors the evaluator's operand guards at the type level so a transform
//! body can be checked against its declared output type before any row is
//! processed.

use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::model::{BinaryOperator, Expr, Span, TernaryOperator, UnaryOperator};
use crate::valuetypes::{TypeRegistry, ValueType};

use super::operators::{binary_guards, ternary_guards, unary_guard, OperandGuard};

const RULE_ID: &str = "expression-types";

/// Types of the names an expression may reference
#[derive(Debug, Clone)]
pub struct TypeEnv<'a> {
    variables: HashMap<String, ValueType>,
    value: Option<ValueType>,
    types: &'a TypeRegistry,
}

impl<'a> TypeEnv<'a> {
    pub fn new(types: &'a TypeRegistry) -> Self {
        Self {
            variables: HashMap::new(),
            value: None,
            types,
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, valuetype: ValueType) -> Self {
        self.variables.insert(name.into(), valuetype);
        self
    }

    pub fn with_value_keyword(mut self, valuetype: ValueType) -> Self {
        self.value = Some(valuetype);
        self
    }

    pub fn types(&self) -> &TypeRegistry {
        self.types
    }
}

pub fn infer_expression_type(
    expr: &Expr,
    env: &TypeEnv<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<ValueType> {
    match expr {
        Expr::Boolean { .. } => Some(ValueType::Boolean),
        Expr::Decimal { .. } => Some(ValueType::Decimal),
        Expr::Integer { .. } => Some(ValueType::Integer),
        Expr::Text { .. } => Some(ValueType::Text),
        Expr::Regex { .. } => Some(ValueType::Regex),
        Expr::CellRange { .. } => Some(ValueType::CellRange),
        Expr::ConstraintRef { .. } => Some(ValueType::Constraint),
        Expr::TransformRef { .. } => Some(ValueType::Transform),
        Expr::ValuetypeAssignment { .. } => Some(ValueType::ValuetypeAssignment),

        Expr::Collection { elements, span } => {
            let element_types: Vec<Option<ValueType>> = elements
                .iter()
                .map(|e| infer_expression_type(e, env, diagnostics))
                .collect();
            let element_types = element_types.into_iter().collect::<Option<Vec<_>>>()?;
            let mut iter = element_types.into_iter();
            let Some(mut common) = iter.next() else {
                return Some(ValueType::EmptyCollection);
            };
            for next in iter {
                common = match unify(&common, &next) {
                    Some(unified) => unified,
                    None => {
                        diagnostics.error(
                            *span,
                            format!(
                                "Collection mixes incompatible element types '{}' and '{}'",
                                common, next
                            ),
                            RULE_ID,
                        );
                        return None;
                    }
                };
            }
            Some(ValueType::collection(common))
        }

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

        Expr::Variable { name, span } => match env.variables.get(name) {
            Some(valuetype) => Some(valuetype.clone()),
            None => {
                diagnostics.error(*span, format!("Unknown variable '{}'", name), RULE_ID);
                None
            }
        },

        Expr::ValueKeyword { span } => match &env.value {
            Some(valuetype) => Some(valuetype.clone()),
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
            let operand = infer_expression_type(operand, env, diagnostics)?;
            check_guard(unary_guard(*operator), &operand, operator.token(), "The", *span, diagnostics)?;
            Some(unary_result(*operator, &operand))
        }

        Expr::Binary {
            operator,
            left,
            right,
            span,
        } => {
            let left = infer_expression_type(left, env, diagnostics);
            let right = infer_expression_type(right, env, diagnostics);
            let (left, right) = (left?, right?);
            let (left_guard, right_guard) = binary_guards(*operator);
            let left_ok = check_guard(left_guard, &left, operator.token(), "Left", *span, diagnostics);
            let right_ok = check_guard(right_guard, &right, operator.token(), "Right", *span, diagnostics);
            left_ok.and(right_ok)?;
            Some(binary_result(*operator, &left, &right))
        }

        Expr::Ternary {
            operator,
            first,
            second,
            third,
            span,
        } => {
            let operands = [first, second, third]
                .map(|operand| infer_expression_type(operand, env, diagnostics));
            let guards = ternary_guards(*operator);
            let positions = ["First", "Second", "Third"];
            let mut ok = true;
            for ((operand, guard), position) in operands.iter().zip(guards).zip(positions) {
                match operand {
                    Some(t) => {
                        ok &= check_guard(guard, t, operator.token(), position, *span, diagnostics)
                            .is_some()
                    }
                    None => ok = false,
                }
            }
            ok.then(|| match operator {
                TernaryOperator::Replace => ValueType::Text,
            })
        }
    }
}

fn check_guard(
    guard: OperandGuard,
    valuetype: &ValueType,
    token: &str,
    position: &str,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> Option<()> {
    if guard.accepts_type(valuetype) {
        return Some(());
    }
    diagnostics.error(
        span,
        format!(
            "{} operand of '{}' must be {}, got '{}'",
            position,
            token,
            guard.describe(),
            valuetype
        ),
        RULE_ID,
    );
    None
}

fn unary_result(operator: UnaryOperator, operand: &ValueType) -> ValueType {
    use UnaryOperator::*;
    match operator {
        Not | AsBoolean => ValueType::Boolean,
        Plus | Minus => match operand.primitive_root() {
            Ok(ValueType::Integer) => ValueType::Integer,
            _ => ValueType::Decimal,
        },
        Sqrt | AsDecimal => ValueType::Decimal,
        Floor | Ceil | Round | AsInteger => ValueType::Integer,
        Lowercase | Uppercase | AsText => ValueType::Text,
    }
}

fn binary_result(operator: BinaryOperator, left: &ValueType, right: &ValueType) -> ValueType {
    use BinaryOperator::*;
    let both_integer = matches!(
        (left.primitive_root(), right.primitive_root()),
        (Ok(ValueType::Integer), Ok(ValueType::Integer))
    );
    match operator {
        Add | Sub | Mul | Mod if both_integer => ValueType::Integer,
        Add | Sub | Mul | Mod | Pow | Root | Div => ValueType::Decimal,
        Matches | In | Lt | Le | Gt | Ge | Eq | Ne | Xor | And | Or => ValueType::Boolean,
    }
}

/// Common type of two collection elements
fn unify(a: &ValueType, b: &ValueType) -> Option<ValueType> {
    if b.is_convertible_to(a) {
        Some(a.clone())
    } else if a.is_convertible_to(b) {
        Some(b.clone())
    } else {
        match (a.primitive_root().ok()?, b.primitive_root().ok()?) {
            (ra, rb) if ra == rb => Some(ra.clone()),
            (ValueType::Integer, ValueType::Decimal) | (ValueType::Decimal, ValueType::Integer) => {
                Some(ValueType::Decimal)
            }
            _ => None,
        }
    }
}
