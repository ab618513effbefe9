//! Column and row removal on sheets
//!
//! Both deleters take a collection of cell ranges. Each range must select a
//! whole column (or row) that exists in the input sheet.

use async_trait::async_trait;

use super::{collection_property, unexpected_input};
use crate::blocks::{BlockExecutor, BlockExecutorClass, BlockOutcome};
use crate::data::{column_letters, CellRange, IoType, IoValue, Sheet};
use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::{InternalValue, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Column,
    Row,
}

impl Axis {
    fn index(self, range: &CellRange) -> Option<usize> {
        match (self, range) {
            (Axis::Column, CellRange::Column(c)) => Some(*c),
            (Axis::Row, CellRange::Row(r)) => Some(*r),
            _ => None,
        }
    }

    fn extent(self, sheet: &Sheet) -> usize {
        match self {
            Axis::Column => sheet.width(),
            Axis::Row => sheet.height(),
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Axis::Column => "column",
            Axis::Row => "row",
        }
    }

    fn describe(self, index: usize) -> String {
        match self {
            Axis::Column => format!("column {}", column_letters(index)),
            Axis::Row => format!("row {}", index + 1),
        }
    }
}

fn delete_spec(docs: &'static str) -> Vec<PropertySpec> {
    vec![PropertySpec::required(
        "delete",
        ValueType::collection(ValueType::CellRange),
        docs,
    )]
}

pub struct ColumnDeleter;

pub(super) fn column_deleter_class() -> BlockExecutorClass {
    BlockExecutorClass {
        block_type: "ColumnDeleter",
        input_type: IoType::Sheet,
        output_type: IoType::Sheet,
        property_specs: delete_spec("Whole columns to delete, e.g. `column B`"),
        factory: column_deleter,
    }
}

fn column_deleter() -> Box<dyn BlockExecutor> {
    Box::new(ColumnDeleter)
}

#[async_trait]
impl BlockExecutor for ColumnDeleter {
    async fn execute(
        &self,
        input: IoValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<BlockOutcome, ExecutionError> {
        delete(Axis::Column, input, ctx)
    }
}

pub struct RowDeleter;

pub(super) fn row_deleter_class() -> BlockExecutorClass {
    BlockExecutorClass {
        block_type: "RowDeleter",
        input_type: IoType::Sheet,
        output_type: IoType::Sheet,
        property_specs: delete_spec("Whole rows to delete, e.g. `row 2`"),
        factory: row_deleter,
    }
}

fn row_deleter() -> Box<dyn BlockExecutor> {
    Box::new(RowDeleter)
}

#[async_trait]
impl BlockExecutor for RowDeleter {
    async fn execute(
        &self,
        input: IoValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<BlockOutcome, ExecutionError> {
        delete(Axis::Row, input, ctx)
    }
}

fn delete(
    axis: Axis,
    input: IoValue,
    ctx: &mut ExecutionContext<'_>,
) -> Result<BlockOutcome, ExecutionError> {
    let IoValue::Sheet(mut sheet) = input else {
        return Err(unexpected_input(ctx, IoType::Sheet, &input));
    };

    let mut ranges = Vec::new();
    for value in collection_property(ctx, "delete", ValueType::CellRange)? {
        let InternalValue::CellRange(range) = value else {
            continue;
        };
        let Some(index) = axis.index(&range) else {
            let hint = match axis {
                Axis::Column => "Select whole columns, e.g. `column B`",
                Axis::Row => "Select whole rows, e.g. `row 2`",
            };
            ctx.log_error(
                format!("Cell range '{}' is not a whole {}", range, axis.noun()),
                Some(hint),
            );
            return Ok(BlockOutcome::HandledFailure);
        };
        if index >= axis.extent(&sheet) {
            ctx.log_error(
                format!(
                    "Cannot delete {}: it does not exist in a sheet with {} rows and {} columns",
                    axis.describe(index),
                    sheet.height(),
                    sheet.width()
                ),
                None,
            );
            return Ok(BlockOutcome::HandledFailure);
        }
        ranges.push(range);
    }

    match axis {
        Axis::Column => sheet.delete_columns(&ranges),
        Axis::Row => sheet.delete_rows(&ranges),
    }
    ctx.log_debug(format!("Deleted {} {}(s)", ranges.len(), axis.noun()));
    Ok(BlockOutcome::Produced(IoValue::Sheet(sheet)))
}
