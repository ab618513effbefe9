use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::{InternalValue, ValueType};

use super::ConstraintExecutor;

/// Text not in `denylist`; anything that is not text is invalid
pub struct DenylistConstraint {
    specs: Vec<PropertySpec>,
}

impl DenylistConstraint {
    pub fn new() -> Self {
        Self {
            specs: vec![PropertySpec::required(
                "denylist",
                ValueType::collection(ValueType::Text),
                "Values that are rejected",
            )],
        }
    }
}

impl Default for DenylistConstraint {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintExecutor for DenylistConstraint {
    fn kind_name(&self) -> &'static str {
        "Denylist"
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
        let denylist = ctx.get_property_value("denylist", &ValueType::collection(ValueType::Text))?;
        let denied = denylist
            .as_collection()
            .unwrap_or_default()
            .iter()
            .any(|entry| entry.as_text() == Some(text.as_str()));
        Ok(!denied)
    }
}
