use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::{InternalValue, ValueType};

use super::ConstraintExecutor;

/// Text listed in `allowlist`
pub struct AllowlistConstraint {
    specs: Vec<PropertySpec>,
}

impl AllowlistConstraint {
    pub fn new() -> Self {
        Self {
            specs: vec![PropertySpec::required(
                "allowlist",
                ValueType::collection(ValueType::Text),
                "The only accepted values",
            )],
        }
    }
}

impl Default for AllowlistConstraint {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintExecutor for AllowlistConstraint {
    fn kind_name(&self) -> &'static str {
        "Allowlist"
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
        let allowlist =
            ctx.get_property_value("allowlist", &ValueType::collection(ValueType::Text))?;
        Ok(allowlist
            .as_collection()
            .unwrap_or_default()
            .iter()
            .any(|entry| entry.as_text() == Some(text.as_str())))
    }
}
