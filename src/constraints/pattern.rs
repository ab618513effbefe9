use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::{InternalValue, ValueType};

use super::ConstraintExecutor;

/// Text matched by `regex`
pub struct RegexConstraint {
    specs: Vec<PropertySpec>,
}

impl RegexConstraint {
    pub fn new() -> Self {
        Self {
            specs: vec![PropertySpec::required(
                "regex",
                ValueType::Regex,
                "Pattern the value must match",
            )],
        }
    }
}

impl Default for RegexConstraint {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintExecutor for RegexConstraint {
    fn kind_name(&self) -> &'static str {
        "Regex"
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
        match ctx.get_property_value("regex", &ValueType::Regex)? {
            InternalValue::Regex(regex) => Ok(regex.regex().is_match(text)),
            _ => Ok(false),
        }
    }
}
