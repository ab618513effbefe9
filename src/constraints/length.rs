use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::{InternalValue, ValueType};

use super::ConstraintExecutor;

/// Text whose character count lies within `minLength..=maxLength`
pub struct LengthConstraint {
    specs: Vec<PropertySpec>,
}

impl LengthConstraint {
    pub fn new() -> Self {
        Self {
            specs: vec![
                PropertySpec::with_default(
                    "minLength",
                    ValueType::Integer,
                    InternalValue::Integer(0),
                    "Inclusive minimum number of characters",
                ),
                PropertySpec::optional(
                    "maxLength",
                    ValueType::Integer,
                    "Inclusive maximum number of characters",
                ),
            ],
        }
    }
}

impl Default for LengthConstraint {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintExecutor for LengthConstraint {
    fn kind_name(&self) -> &'static str {
        "Length"
    }

    fn property_specs(&self) -> &[PropertySpec] {
        &self.specs
    }

    fn is_valid(
        &self,
        value: &InternalValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<bool, ExecutionError> {
        let InternalValue::Text(text) = value else {
            return Ok(false);
        };
        let length = text.chars().count() as i64;

        if let InternalValue::Integer(min) = ctx.get_property_value("minLength", &ValueType::Integer)? {
            if length < min {
                return Ok(false);
            }
        }
        if let Some(InternalValue::Integer(max)) =
            ctx.get_optional_property_value("maxLength", &ValueType::Integer)?
        {
            if length > max {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
