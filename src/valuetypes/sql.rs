//! SQL representations of value types and values for relational loaders

use super::{InternalValue, ValueType, ValueTypeError, ValueTypeVisitor};

/// Maps a value type to a SQL column type
pub struct SqlColumnTypeVisitor;

impl ValueTypeVisitor for SqlColumnTypeVisitor {
    type Output = &'static str;

    fn visitor_name(&self) -> &'static str {
        "SQL column type mapping"
    }

    fn visit_boolean(&mut self) -> Result<Self::Output, ValueTypeError> {
        Ok("boolean")
    }

    fn visit_decimal(&mut self) -> Result<Self::Output, ValueTypeError> {
        Ok("real")
    }

    fn visit_integer(&mut self) -> Result<Self::Output, ValueTypeError> {
        Ok("integer")
    }

    fn visit_text(&mut self) -> Result<Self::Output, ValueTypeError> {
        Ok("text")
    }
}

pub fn sql_column_type(valuetype: &ValueType) -> Result<&'static str, ValueTypeError> {
    valuetype.accept_visitor(&mut SqlColumnTypeVisitor)
}

/// Renders one cell value as a SQL literal of the column's type
pub struct SqlValueRepresentationVisitor<'v> {
    value: &'v InternalValue,
}

impl<'v> SqlValueRepresentationVisitor<'v> {
    pub fn new(value: &'v InternalValue) -> Self {
        Self { value }
    }
}

impl ValueTypeVisitor for SqlValueRepresentationVisitor<'_> {
    type Output = String;

    fn visitor_name(&self) -> &'static str {
        "SQL value representation"
    }

    fn visit_boolean(&mut self) -> Result<Self::Output, ValueTypeError> {
        Ok(match self.value {
            InternalValue::Boolean(true) => "'true'".to_string(),
            InternalValue::Boolean(false) => "'false'".to_string(),
            _ => "NULL".to_string(),
        })
    }

    fn visit_decimal(&mut self) -> Result<Self::Output, ValueTypeError> {
        Ok(match self.value.as_number() {
            Some(n) if n.is_finite() => n.to_string(),
            _ => "NULL".to_string(),
        })
    }

    fn visit_integer(&mut self) -> Result<Self::Output, ValueTypeError> {
        Ok(match self.value {
            InternalValue::Integer(i) => i.to_string(),
            _ => "NULL".to_string(),
        })
    }

    fn visit_text(&mut self) -> Result<Self::Output, ValueTypeError> {
        Ok(match self.value {
            InternalValue::Text(s) => format!("'{}'", escape_single_quotes(s)),
            _ => "NULL".to_string(),
        })
    }
}

pub fn sql_value_representation(
    value: &InternalValue,
    valuetype: &ValueType,
) -> Result<String, ValueTypeError> {
    valuetype.accept_visitor(&mut SqlValueRepresentationVisitor::new(value))
}

pub fn escape_single_quotes(s: &str) -> String {
    s.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuetypes::ValueTypeKind;

    #[test]
    fn test_column_types_for_primitives() {
        assert_eq!(sql_column_type(&ValueType::Boolean).unwrap(), "boolean");
        assert_eq!(sql_column_type(&ValueType::Decimal).unwrap(), "real");
        assert_eq!(sql_column_type(&ValueType::Integer).unwrap(), "integer");
        assert_eq!(sql_column_type(&ValueType::Text).unwrap(), "text");
    }

    #[test]
    fn test_atomic_maps_through_supertype_chain() {
        let zip = ValueType::atomic("Zip", ValueType::Integer, vec![]);
        let german_zip = ValueType::atomic("GermanZip", zip, vec![]);
        assert_eq!(sql_column_type(&german_zip).unwrap(), "integer");
    }

    #[test]
    fn test_structural_kinds_fail_loudly() {
        let err = sql_column_type(&ValueType::collection(ValueType::Text)).unwrap_err();
        assert_eq!(
            err,
            ValueTypeError::UnsupportedKind {
                visitor: "SQL column type mapping",
                kind: ValueTypeKind::Collection,
            }
        );
        assert!(sql_column_type(&ValueType::Regex).is_err());
        assert!(sql_column_type(&ValueType::ValuetypeAssignment).is_err());
    }

    #[test]
    fn test_value_literals() {
        assert_eq!(
            sql_value_representation(&InternalValue::text("it's"), &ValueType::Text).unwrap(),
            "'it''s'"
        );
        assert_eq!(
            sql_value_representation(&InternalValue::Integer(3), &ValueType::Decimal).unwrap(),
            "3"
        );
        assert_eq!(
            sql_value_representation(&InternalValue::Boolean(false), &ValueType::Boolean).unwrap(),
            "'false'"
        );
        assert_eq!(
            sql_value_representation(&InternalValue::text("x"), &ValueType::Integer).unwrap(),
            "NULL"
        );
    }
}
