use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::{InternalValue, ValueType};

use super::ConstraintExecutor;

/// Number between optional lower and upper bounds, each inclusive by default
pub struct RangeConstraint {
    specs: Vec<PropertySpec>,
}

impl RangeConstraint {
    pub fn new() -> Self {
        Self {
            specs: vec![
                PropertySpec::optional("lowerBound", ValueType::Decimal, "Lower bound"),
                PropertySpec::with_default(
                    "lowerBoundInclusive",
                    ValueType::Boolean,
                    InternalValue::Boolean(true),
                    "Whether the lower bound itself is valid",
                ),
                PropertySpec::optional("upperBound", ValueType::Decimal, "Upper bound"),
                PropertySpec::with_default(
                    "upperBoundInclusive",
                    ValueType::Boolean,
                    InternalValue::Boolean(true),
                    "Whether the upper bound itself is valid",
                ),
            ],
        }
    }
}

impl Default for RangeConstraint {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintExecutor for RangeConstraint {
    fn kind_name(&self) -> &'static str {
        "Range"
    }

    fn property_specs(&self) -> &[PropertySpec] {
        &self.specs
    }

    fn is_valid(
        &self,
        value: &InternalValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<bool, ExecutionError> {
        let Some(number) = value.as_number() else {
            return Ok(false);
        };

        if let Some(lower) = bound(ctx, "lowerBound")? {
            let inclusive = flag(ctx, "lowerBoundInclusive")?;
            if number < lower || (!inclusive && number == lower) {
                return Ok(false);
            }
        }
        if let Some(upper) = bound(ctx, "upperBound")? {
            let inclusive = flag(ctx, "upperBoundInclusive")?;
            if number > upper || (!inclusive && number == upper) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn bound(ctx: &mut ExecutionContext<'_>, name: &str) -> Result<Option<f64>, ExecutionError> {
    Ok(ctx
        .get_optional_property_value(name, &ValueType::Decimal)?
        .and_then(|v| v.as_number()))
}

fn flag(ctx: &mut ExecutionContext<'_>, name: &str) -> Result<bool, ExecutionError> {
    Ok(ctx
        .get_property_value(name, &ValueType::Boolean)?
        .as_bool()
        .unwrap_or(true))
}
