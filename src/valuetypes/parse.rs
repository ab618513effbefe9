//! Raw string → internal value parsing
//!
//! Used for runtime parameters and sheet cells, which both arrive as text.

use std::sync::OnceLock;

use regex::Regex;

use super::{InternalValue, ValueType};

const NUMBER_PATTERN: &str = r"^[+-]?([0-9]*[,.])?[0-9]+([eE][+-]?\d+)?$";

fn number_regex() -> &'static Regex {
    static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
    NUMBER_REGEX.get_or_init(|| Regex::new(NUMBER_PATTERN).expect("number pattern is valid"))
}

/// Parse `raw` into the internal representation of `valuetype`.
///
/// Returns `None` when the text is not a valid representation. Structural
/// kinds (collections, regexes, ...) are never parsed from raw text.
pub fn parse_value_representation(raw: &str, valuetype: &ValueType) -> Option<InternalValue> {
    match valuetype {
        ValueType::Boolean => parse_boolean(raw).map(InternalValue::Boolean),
        ValueType::Decimal => parse_decimal(raw).map(InternalValue::Decimal),
        ValueType::Integer => parse_integer(raw).map(InternalValue::Integer),
        ValueType::Text => Some(InternalValue::Text(raw.to_string())),
        ValueType::Atomic(atomic) => atomic
            .supertype
            .as_ref()
            .and_then(|supertype| parse_value_representation(raw, supertype)),
        ValueType::Collection(_)
        | ValueType::EmptyCollection
        | ValueType::Regex
        | ValueType::CellRange
        | ValueType::Constraint
        | ValueType::Transform
        | ValueType::ValuetypeAssignment => None,
    }
}

pub fn parse_boolean(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Decimal notation with `.` or `,` as separator and an optional exponent
pub fn parse_decimal(raw: &str) -> Option<f64> {
    if !number_regex().is_match(raw) {
        return None;
    }
    raw.replacen(',', ".", 1).parse::<f64>().ok()
}

/// Decimal notation whose value has no fractional part, e.g. `5.3e3`
pub fn parse_integer(raw: &str) -> Option<i64> {
    let value = parse_decimal(raw)?;
    if !value.is_finite() || value.trunc() != value {
        return None;
    }
    // i64::MAX is not representable as f64; the cast boundary is 2^63
    if value < -9_223_372_036_854_775_808.0 || value >= 9_223_372_036_854_775_808.0 {
        return None;
    }
    Some(value as i64)
}
