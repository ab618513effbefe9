//! Sheet → typed table
//!
//! With a header row, declared columns are matched to sheet columns by
//! header text; without one, by position. A row is kept only when every
//! declared column parses and satisfies its value type's constraints.

use async_trait::async_trait;

use super::{boolean_property, collection_property, unexpected_input};
use crate::blocks::{BlockExecutor, BlockExecutorClass, BlockOutcome};
use crate::constraints::is_value_valid;
use crate::data::{column_letters, IoType, IoValue, Sheet, Table, TableColumn};
use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::{parse_value_representation, InternalValue, ValueType, ValuetypeAssignment};

pub struct TableInterpreter;

pub(super) fn class() -> BlockExecutorClass {
    BlockExecutorClass {
        block_type: "TableInterpreter",
        input_type: IoType::Sheet,
        output_type: IoType::Table,
        property_specs: vec![
            PropertySpec::with_default(
                "header",
                ValueType::Boolean,
                InternalValue::Boolean(true),
                "Whether the first row holds column names",
            ),
            PropertySpec::required(
                "columns",
                ValueType::collection(ValueType::ValuetypeAssignment),
                "Columns to keep, e.g. `\"name\" oftype text`",
            ),
        ],
        factory,
    }
}

fn factory() -> Box<dyn BlockExecutor> {
    Box::new(TableInterpreter)
}

#[async_trait]
impl BlockExecutor for TableInterpreter {
    async fn execute(
        &self,
        input: IoValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<BlockOutcome, ExecutionError> {
        let IoValue::Sheet(sheet) = input else {
            return Err(unexpected_input(ctx, IoType::Sheet, &input));
        };
        let header = boolean_property(ctx, "header")?;
        let columns: Vec<ValuetypeAssignment> =
            collection_property(ctx, "columns", ValueType::ValuetypeAssignment)?
                .into_iter()
                .filter_map(|value| match value {
                    InternalValue::ValuetypeAssignment(assignment) => Some(assignment),
                    _ => None,
                })
                .collect();

        let Some(indices) = column_indices(&sheet, &columns, header, ctx) else {
            return Ok(BlockOutcome::HandledFailure);
        };

        let first_data_row = usize::from(header);
        let mut values: Vec<Vec<InternalValue>> = vec![Vec::new(); columns.len()];
        let mut dropped = 0;

        for row in first_data_row..sheet.height() {
            match interpret_row(&sheet, row, &columns, &indices, ctx)? {
                Some(cells) => {
                    for (column, cell) in values.iter_mut().zip(cells) {
                        column.push(cell);
                    }
                }
                None => dropped += 1,
            }
        }

        let number_of_rows = sheet.height().saturating_sub(first_data_row) - dropped;
        let mut table = Table::new(number_of_rows);
        for (assignment, column_values) in columns.into_iter().zip(values) {
            table.add_column(TableColumn::new(
                assignment.name,
                assignment.valuetype,
                column_values,
            ))?;
        }

        if dropped > 0 {
            ctx.log_info(format!("Dropped {} row(s) with invalid values", dropped));
        }
        ctx.log_debug(format!(
            "Validation completed, the resulting table has {} row(s) and {} column(s)",
            table.number_of_rows(),
            table.number_of_columns()
        ));
        Ok(BlockOutcome::Produced(IoValue::Table(table)))
    }
}

/// Sheet column of each declared column; `None` after logging a mismatch
fn column_indices(
    sheet: &Sheet,
    columns: &[ValuetypeAssignment],
    header: bool,
    ctx: &mut ExecutionContext<'_>,
) -> Option<Vec<usize>> {
    if !header {
        if columns.len() > sheet.width() {
            ctx.log_error(
                format!(
                    "{} columns declared but the sheet only has {}",
                    columns.len(),
                    sheet.width()
                ),
                None,
            );
            return None;
        }
        return Some((0..columns.len()).collect());
    }

    let header_row = sheet.header_row().unwrap_or_default();
    let mut indices = Vec::with_capacity(columns.len());
    for column in columns {
        match header_row.iter().position(|name| name.trim() == column.name) {
            Some(index) => indices.push(index),
            None => {
                ctx.log_error(
                    format!("Column '{}' not found in the header row", column.name),
                    Some("Column names must match the header text exactly"),
                );
                return None;
            }
        }
    }
    Some(indices)
}

/// Parsed cells of `row`, or `None` when any cell is invalid
fn interpret_row(
    sheet: &Sheet,
    row: usize,
    columns: &[ValuetypeAssignment],
    indices: &[usize],
    ctx: &mut ExecutionContext<'_>,
) -> Result<Option<Vec<InternalValue>>, ExecutionError> {
    let mut cells = Vec::with_capacity(columns.len());
    for (column, &index) in columns.iter().zip(indices) {
        let raw = sheet.cell(row, index).unwrap_or_default();
        let parsed = parse_value_representation(raw, &column.valuetype);
        let valid = match &parsed {
            Some(value) => is_value_valid(value, &column.valuetype, ctx)?,
            None => false,
        };
        match parsed {
            Some(value) if valid => cells.push(value),
            _ => {
                ctx.log_debug(format!(
                    "Dropping row {}: '{}' in cell {}{} is not a valid {}",
                    row + 1,
                    raw,
                    column_letters(index),
                    row + 1,
                    column.valuetype
                ));
                return Ok(None);
            }
        }
    }
    Ok(Some(cells))
}
