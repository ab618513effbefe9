//! Operator semantics over evaluated operands
//!
//! Each operator declares an [`OperandGuard`] per operand. A guard mismatch
//! is reported and yields `None`; so does every arithmetic edge case. Numeric
//! operators work on `f64`, except `+`, `-`, `*` and `%` on two integers,
//! which stay integral until a result leaves the `i64` range and widens to a
//! decimal.

use regex::{NoExpand, Regex};

use crate::diagnostics::Diagnostics;
use crate::model::{BinaryOperator, Span, TernaryOperator, UnaryOperator};
use crate::valuetypes::parse::{parse_boolean, parse_decimal, parse_integer};
use crate::valuetypes::{InternalValue, ValueType};

pub(crate) const RULE_ID: &str = "expression-evaluation";

/* ===================== Guards ===================== */

/// Operand shape an operator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandGuard {
    Boolean,
    Numeric,
    Text,
    Collection,
    RegexOrText,
    Any,
}

impl OperandGuard {
    pub fn accepts(self, value: &InternalValue) -> bool {
        match self {
            OperandGuard::Boolean => matches!(value, InternalValue::Boolean(_)),
            OperandGuard::Numeric => value.is_numeric(),
            OperandGuard::Text => matches!(value, InternalValue::Text(_)),
            OperandGuard::Collection => matches!(value, InternalValue::Collection(_)),
            OperandGuard::RegexOrText => {
                matches!(value, InternalValue::Regex(_) | InternalValue::Text(_))
            }
            OperandGuard::Any => true,
        }
    }

    /// Static counterpart of [`accepts`](Self::accepts) used by type inference
    pub fn accepts_type(self, valuetype: &ValueType) -> bool {
        let root = match valuetype.primitive_root() {
            Ok(root) => root,
            Err(_) => return false,
        };
        match self {
            OperandGuard::Boolean => matches!(root, ValueType::Boolean),
            OperandGuard::Numeric => matches!(root, ValueType::Integer | ValueType::Decimal),
            OperandGuard::Text => matches!(root, ValueType::Text),
            OperandGuard::Collection => {
                matches!(root, ValueType::Collection(_) | ValueType::EmptyCollection)
            }
            OperandGuard::RegexOrText => matches!(root, ValueType::Regex | ValueType::Text),
            OperandGuard::Any => true,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            OperandGuard::Boolean => "a boolean",
            OperandGuard::Numeric => "a number",
            OperandGuard::Text => "a text",
            OperandGuard::Collection => "a collection",
            OperandGuard::RegexOrText => "a regex or text",
            OperandGuard::Any => "any value",
        }
    }
}

pub fn unary_guard(operator: UnaryOperator) -> OperandGuard {
    match operator {
        UnaryOperator::Not => OperandGuard::Boolean,
        UnaryOperator::Plus
        | UnaryOperator::Minus
        | UnaryOperator::Sqrt
        | UnaryOperator::Floor
        | UnaryOperator::Ceil
        | UnaryOperator::Round => OperandGuard::Numeric,
        UnaryOperator::Lowercase | UnaryOperator::Uppercase => OperandGuard::Text,
        UnaryOperator::AsDecimal
        | UnaryOperator::AsInteger
        | UnaryOperator::AsBoolean
        | UnaryOperator::AsText => OperandGuard::Any,
    }
}

pub fn binary_guards(operator: BinaryOperator) -> (OperandGuard, OperandGuard) {
    use BinaryOperator::*;
    match operator {
        Pow | Root | Mul | Div | Mod | Add | Sub | Lt | Le | Gt | Ge => {
            (OperandGuard::Numeric, OperandGuard::Numeric)
        }
        Matches => (OperandGuard::Text, OperandGuard::RegexOrText),
        In => (OperandGuard::Any, OperandGuard::Collection),
        Eq | Ne => (OperandGuard::Any, OperandGuard::Any),
        Xor | And | Or => (OperandGuard::Boolean, OperandGuard::Boolean),
    }
}

pub fn ternary_guards(operator: TernaryOperator) -> [OperandGuard; 3] {
    match operator {
        TernaryOperator::Replace => [
            OperandGuard::Text,
            OperandGuard::RegexOrText,
            OperandGuard::Text,
        ],
    }
}

/// Report and return false when `value` does not satisfy `guard`
pub fn check_operand(
    guard: OperandGuard,
    value: &InternalValue,
    token: &str,
    position: &str,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> bool {
    if guard.accepts(value) {
        return true;
    }
    diagnostics.error(
        span,
        format!(
            "{} operand of '{}' must be {}, got {} '{}'",
            position,
            token,
            guard.describe(),
            value.kind_name(),
            value
        ),
        RULE_ID,
    );
    false
}

/* ===================== Unary ===================== */

pub fn evaluate_unary(
    operator: UnaryOperator,
    operand: &InternalValue,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> Option<InternalValue> {
    if !check_operand(
        unary_guard(operator),
        operand,
        operator.token(),
        "The",
        span,
        diagnostics,
    ) {
        return None;
    }

    match operator {
        UnaryOperator::Not => operand.as_bool().map(|b| InternalValue::Boolean(!b)),
        UnaryOperator::Plus => Some(operand.clone()),
        UnaryOperator::Minus => match operand {
            InternalValue::Integer(i) => Some(match i.checked_neg() {
                Some(negated) => InternalValue::Integer(negated),
                None => InternalValue::Decimal(-(*i as f64)),
            }),
            other => other.as_number().map(|n| InternalValue::Decimal(-n)),
        },
        UnaryOperator::Sqrt => {
            let n = operand.as_number()?;
            if n < 0.0 {
                diagnostics.error(span, "square root of negative number", RULE_ID);
                return None;
            }
            Some(InternalValue::Decimal(n.sqrt()))
        }
        UnaryOperator::Floor => integral(operand, f64::floor, span, diagnostics),
        UnaryOperator::Ceil => integral(operand, f64::ceil, span, diagnostics),
        UnaryOperator::Round => integral(operand, round_half_up, span, diagnostics),
        UnaryOperator::Lowercase => operand.as_text().map(|s| InternalValue::text(s.to_lowercase())),
        UnaryOperator::Uppercase => operand.as_text().map(|s| InternalValue::text(s.to_uppercase())),
        UnaryOperator::AsDecimal => {
            let converted = match operand {
                InternalValue::Decimal(d) => Some(*d),
                InternalValue::Integer(i) => Some(*i as f64),
                InternalValue::Text(s) => parse_decimal(s),
                _ => None,
            };
            conversion(converted.map(InternalValue::Decimal), operand, "decimal", span, diagnostics)
        }
        UnaryOperator::AsInteger => {
            let converted = match operand {
                InternalValue::Integer(i) => Some(*i),
                InternalValue::Decimal(d) => exact_integer(*d),
                InternalValue::Text(s) => parse_integer(s),
                _ => None,
            };
            conversion(converted.map(InternalValue::Integer), operand, "integer", span, diagnostics)
        }
        UnaryOperator::AsBoolean => {
            let converted = match operand {
                InternalValue::Boolean(b) => Some(*b),
                InternalValue::Text(s) => parse_boolean(s),
                InternalValue::Integer(0) => Some(false),
                InternalValue::Integer(1) => Some(true),
                _ => None,
            };
            conversion(converted.map(InternalValue::Boolean), operand, "boolean", span, diagnostics)
        }
        UnaryOperator::AsText => Some(InternalValue::text(operand.to_display_string())),
    }
}

fn integral(
    operand: &InternalValue,
    round: fn(f64) -> f64,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> Option<InternalValue> {
    match operand {
        InternalValue::Integer(i) => Some(InternalValue::Integer(*i)),
        other => {
            let rounded = round(other.as_number()?);
            match exact_integer(rounded) {
                Some(i) => Some(InternalValue::Integer(i)),
                None => {
                    diagnostics.error(span, "arithmetic error", RULE_ID);
                    None
                }
            }
        }
    }
}

fn conversion(
    converted: Option<InternalValue>,
    operand: &InternalValue,
    target: &str,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> Option<InternalValue> {
    if converted.is_none() {
        diagnostics.error(
            span,
            format!(
                "Cannot convert {} '{}' to {}",
                operand.kind_name(),
                operand,
                target
            ),
            RULE_ID,
        );
    }
    converted
}

/// `Some` iff `value` is finite, integral and within `i64`
fn exact_integer(value: f64) -> Option<i64> {
    if !value.is_finite() || value.trunc() != value {
        return None;
    }
    if value < -9_223_372_036_854_775_808.0 || value >= 9_223_372_036_854_775_808.0 {
        return None;
    }
    Some(value as i64)
}

/* ===================== Binary ===================== */

pub fn evaluate_binary(
    operator: BinaryOperator,
    left: &InternalValue,
    right: &InternalValue,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> Option<InternalValue> {
    let (left_guard, right_guard) = binary_guards(operator);
    let token = operator.token();
    let left_ok = check_operand(left_guard, left, token, "Left", span, diagnostics);
    let right_ok = check_operand(right_guard, right, token, "Right", span, diagnostics);
    if !(left_ok && right_ok) {
        return None;
    }

    use BinaryOperator::*;
    match operator {
        Add => Some(integer_or_decimal(left, right, i64::checked_add, |a, b| a + b)),
        Sub => Some(integer_or_decimal(left, right, i64::checked_sub, |a, b| a - b)),
        Mul => Some(integer_or_decimal(left, right, i64::checked_mul, |a, b| a * b)),
        Div => {
            let result = left.as_number()? / right.as_number()?;
            if !result.is_finite() {
                diagnostics.error(span, "division by zero", RULE_ID);
                return None;
            }
            Some(InternalValue::Decimal(result))
        }
        Mod => modulo(left, right, span, diagnostics),
        Pow => {
            let (base, exponent) = (left.as_number()?, right.as_number()?);
            let result = base.powf(exponent);
            if !result.is_finite() {
                let message = if base == 0.0 && exponent < 0.0 {
                    "zero raised to a negative number"
                } else {
                    "arithmetic error"
                };
                diagnostics.error(span, message, RULE_ID);
                return None;
            }
            Some(InternalValue::Decimal(result))
        }
        Root => {
            let result = left.as_number()?.powf(1.0 / right.as_number()?);
            if !result.is_finite() {
                diagnostics.error(span, "arithmetic error", RULE_ID);
                return None;
            }
            Some(InternalValue::Decimal(result))
        }
        Lt => compare(left, right, |a, b| a < b),
        Le => compare(left, right, |a, b| a <= b),
        Gt => compare(left, right, |a, b| a > b),
        Ge => compare(left, right, |a, b| a >= b),
        Eq => Some(InternalValue::Boolean(values_equal(left, right))),
        Ne => Some(InternalValue::Boolean(!values_equal(left, right))),
        In => {
            let items = right.as_collection()?;
            Some(InternalValue::Boolean(
                items.iter().any(|item| values_equal(left, item)),
            ))
        }
        Matches => {
            let text = left.as_text()?;
            let regex = pattern_regex(right, span, diagnostics)?;
            Some(InternalValue::Boolean(regex.is_match(text)))
        }
        Xor => Some(InternalValue::Boolean(left.as_bool()? != right.as_bool()?)),
        And => Some(InternalValue::Boolean(left.as_bool()? && right.as_bool()?)),
        Or => Some(InternalValue::Boolean(left.as_bool()? || right.as_bool()?)),
    }
}

fn integer_or_decimal(
    left: &InternalValue,
    right: &InternalValue,
    integer_op: fn(i64, i64) -> Option<i64>,
    decimal_op: fn(f64, f64) -> f64,
) -> InternalValue {
    if let (InternalValue::Integer(a), InternalValue::Integer(b)) = (left, right) {
        if let Some(result) = integer_op(*a, *b) {
            return InternalValue::Integer(result);
        }
    }
    let a = left.as_number().unwrap_or(f64::NAN);
    let b = right.as_number().unwrap_or(f64::NAN);
    InternalValue::Decimal(decimal_op(a, b))
}

/// Halves round toward positive infinity, so `-2.5` becomes `-2`
fn round_half_up(n: f64) -> f64 {
    (n + 0.5).floor()
}

fn modulo(
    left: &InternalValue,
    right: &InternalValue,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> Option<InternalValue> {
    if let (InternalValue::Integer(a), InternalValue::Integer(b)) = (left, right) {
        if *b == 0 {
            diagnostics.error(span, "modulo by zero", RULE_ID);
            return None;
        }
        return Some(InternalValue::Integer(a.wrapping_rem(*b)));
    }
    let (dividend, divisor) = (left.as_number()?, right.as_number()?);
    let result = dividend % divisor;
    if !result.is_finite() {
        let message = if divisor == 0.0 {
            "modulo by zero"
        } else {
            "arithmetic error"
        };
        diagnostics.error(span, message, RULE_ID);
        return None;
    }
    Some(InternalValue::Decimal(result))
}

fn compare(
    left: &InternalValue,
    right: &InternalValue,
    op: fn(f64, f64) -> bool,
) -> Option<InternalValue> {
    Some(InternalValue::Boolean(op(left.as_number()?, right.as_number()?)))
}

/// Equality with numeric widening, so `1 == 1.0`
pub fn values_equal(left: &InternalValue, right: &InternalValue) -> bool {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

fn pattern_regex(
    pattern: &InternalValue,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> Option<Regex> {
    match pattern {
        InternalValue::Regex(regex) => Some(regex.regex().clone()),
        InternalValue::Text(source) => match Regex::new(source) {
            Ok(regex) => Some(regex),
            Err(e) => {
                diagnostics.error(span, format!("Invalid regex '{}': {}", source, e), RULE_ID);
                None
            }
        },
        _ => None,
    }
}

/* ===================== Ternary ===================== */

pub fn evaluate_ternary(
    operator: TernaryOperator,
    first: &InternalValue,
    second: &InternalValue,
    third: &InternalValue,
    span: Span,
    diagnostics: &mut Diagnostics,
) -> Option<InternalValue> {
    let [g1, g2, g3] = ternary_guards(operator);
    let token = operator.token();
    let ok = [
        check_operand(g1, first, token, "First", span, diagnostics),
        check_operand(g2, second, token, "Second", span, diagnostics),
        check_operand(g3, third, token, "Third", span, diagnostics),
    ];
    if ok.contains(&false) {
        return None;
    }

    match operator {
        TernaryOperator::Replace => {
            let text = first.as_text()?;
            let replacement = third.as_text()?;
            let replaced = match second {
                InternalValue::Text(needle) => text.replace(needle.as_str(), replacement),
                other => pattern_regex(other, span, diagnostics)?
                    .replace_all(text, NoExpand(replacement))
                    .into_owned(),
            };
            Some(InternalValue::Text(replaced))
        }
    }
}
