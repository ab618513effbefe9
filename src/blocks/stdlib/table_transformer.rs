//! Computes one output column from input columns with a transform
//!
//! The transform body is evaluated once per row with the transform's input
//! ports bound to the row's cells. Rows whose evaluation fails, or whose
//! result is not a valid value of the output type, are dropped.

use async_trait::async_trait;

use super::{collection_property, text_property, unexpected_input};
use crate::blocks::{BlockExecutor, BlockExecutorClass, BlockOutcome};
use crate::constraints::is_value_valid;
use crate::data::{IoType, IoValue, Table, TableColumn};
use crate::diagnostics::Diagnostics;
use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::expressions::evaluate_expression;
use crate::model::TransformDefinition;
use crate::valuetypes::{InternalValue, ValueType};

pub struct TableTransformer;

pub(super) fn class() -> BlockExecutorClass {
    BlockExecutorClass {
        block_type: "TableTransformer",
        input_type: IoType::Table,
        output_type: IoType::Table,
        property_specs: vec![
            PropertySpec::required(
                "inputColumns",
                ValueType::collection(ValueType::Text),
                "Columns bound to the transform inputs, in port order",
            ),
            PropertySpec::required(
                "outputColumn",
                ValueType::Text,
                "Column receiving the result; replaced if it exists",
            ),
            PropertySpec::required("uses", ValueType::Transform, "Transform to apply"),
        ],
        factory,
    }
}

fn factory() -> Box<dyn BlockExecutor> {
    Box::new(TableTransformer)
}

#[async_trait]
impl BlockExecutor for TableTransformer {
    async fn execute(
        &self,
        input: IoValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<BlockOutcome, ExecutionError> {
        let IoValue::Table(table) = input else {
            return Err(unexpected_input(ctx, IoType::Table, &input));
        };
        let input_columns: Vec<String> = collection_property(ctx, "inputColumns", ValueType::Text)?
            .into_iter()
            .filter_map(|value| match value {
                InternalValue::Text(name) => Some(name),
                _ => None,
            })
            .collect();
        let output_column = text_property(ctx, "outputColumn")?;
        let transform = match ctx.get_property_value("uses", &ValueType::Transform)? {
            InternalValue::Transform(name) => ctx
                .model()
                .transform(&name)
                .ok_or(ExecutionError::UnknownTransform(name))?,
            other => {
                return Err(ExecutionError::InvalidPropertyValue {
                    property: "uses".to_string(),
                    expected: ValueType::Transform.to_string(),
                    message: format!("got {} '{}'", other.kind_name(), other),
                })
            }
        };

        let Some(output_type) = check_bindings(&table, &input_columns, transform, ctx) else {
            return Ok(BlockOutcome::HandledFailure);
        };

        let mut keep = Vec::with_capacity(table.number_of_rows());
        let mut outputs = Vec::new();
        for row in 0..table.number_of_rows() {
            match transform_row(&table, row, &input_columns, transform, &output_type, ctx)? {
                Some(value) => {
                    keep.push(true);
                    outputs.push(value);
                }
                None => keep.push(false),
            }
        }

        let dropped = keep.iter().filter(|kept| !**kept).count();
        if dropped > 0 {
            ctx.log_info(format!(
                "Dropped {} row(s) where transform '{}' failed",
                dropped, transform.name
            ));
        }
        if table.column(&output_column).is_some() {
            ctx.log_debug(format!("Replacing existing column '{}'", output_column));
        }

        let mut table = table.retain_rows(&keep);
        table.put_column(TableColumn::new(output_column, output_type, outputs))?;
        Ok(BlockOutcome::Produced(IoValue::Table(table)))
    }
}

/// Output type of `transform` once every input column exists and converts
/// to its port type; `None` after logging the first problem
fn check_bindings(
    table: &Table,
    input_columns: &[String],
    transform: &TransformDefinition,
    ctx: &mut ExecutionContext<'_>,
) -> Option<ValueType> {
    if input_columns.len() != transform.inputs.len() {
        ctx.log_error(
            format!(
                "Transform '{}' expects {} input(s) but {} column(s) were given",
                transform.name,
                transform.inputs.len(),
                input_columns.len()
            ),
            None,
        );
        return None;
    }

    for (column_name, port) in input_columns.iter().zip(&transform.inputs) {
        let Some(column) = table.column(column_name) else {
            ctx.log_error(format!("Column '{}' does not exist", column_name), None);
            return None;
        };
        let Some(port_type) = ctx.types().resolve(&port.valuetype) else {
            ctx.log_error(
                format!("Unknown value type '{}' of input '{}'", port.valuetype, port.name),
                None,
            );
            return None;
        };
        if !column.value_type.is_convertible_to(&port_type) {
            ctx.log_error(
                format!(
                    "Column '{}' of type '{}' cannot be used as input '{}' of type '{}'",
                    column_name, column.value_type, port.name, port_type
                ),
                None,
            );
            return None;
        }
    }

    let output_type = ctx.types().resolve(&transform.output);
    if output_type.is_none() {
        ctx.log_error(
            format!(
                "Unknown output type '{}' of transform '{}'",
                transform.output, transform.name
            ),
            None,
        );
    }
    output_type
}

fn transform_row(
    table: &Table,
    row: usize,
    input_columns: &[String],
    transform: &TransformDefinition,
    output_type: &ValueType,
    ctx: &mut ExecutionContext<'_>,
) -> Result<Option<InternalValue>, ExecutionError> {
    let mut evaluation = ctx.evaluation_context();
    for (column_name, port) in input_columns.iter().zip(&transform.inputs) {
        if let Some(value) = table.column(column_name).and_then(|c| c.values.get(row)) {
            evaluation.bind(port.name.clone(), value.clone());
        }
    }

    let mut diagnostics = Diagnostics::new();
    let Some(value) = evaluate_expression(&transform.body, &evaluation, &mut diagnostics) else {
        for diagnostic in diagnostics.iter() {
            ctx.log_debug(format!("Row {}: {}", row + 1, diagnostic.message));
        }
        return Ok(None);
    };

    let value = match (value, output_type.primitive_root()?) {
        (InternalValue::Integer(i), ValueType::Decimal) => InternalValue::Decimal(i as f64),
        (value, _) => value,
    };
    if !is_value_valid(&value, output_type, ctx)? {
        ctx.log_debug(format!(
            "Row {}: result '{}' is not a valid {}",
            row + 1,
            value,
            output_type
        ));
        return Ok(None);
    }
    Ok(Some(value))
}
