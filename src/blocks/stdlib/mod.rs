//! Standard block executors

mod csv;
mod deleters;
mod local_file;
mod postgres;
mod table_interpreter;
mod table_transformer;
mod text_file;

use crate::data::{IoType, IoValue};
use crate::execution::{ExecutionContext, ExecutionError};
use crate::valuetypes::{InternalValue, ValueType};

use super::BlockExecutorClass;

pub use csv::{parse_csv, CsvDialect, CsvError, CsvInterpreter};
pub use deleters::{ColumnDeleter, RowDeleter};
pub use local_file::LocalFileExtractor;
pub use postgres::{create_table_statement, insert_statements, PostgresLoader};
pub use table_interpreter::TableInterpreter;
pub use table_transformer::TableTransformer;
pub use text_file::{decode, TextFileInterpreter};

/// Every standard block type
pub fn classes() -> Vec<BlockExecutorClass> {
    vec![
        local_file::class(),
        text_file::class(),
        csv::class(),
        deleters::column_deleter_class(),
        deleters::row_deleter_class(),
        table_interpreter::class(),
        table_transformer::class(),
        postgres::class(),
    ]
}

/* ===================== Property helpers ===================== */

fn invalid(property: &str, expected: &ValueType, value: &InternalValue) -> ExecutionError {
    ExecutionError::InvalidPropertyValue {
        property: property.to_string(),
        expected: expected.to_string(),
        message: format!("got {} '{}'", value.kind_name(), value),
    }
}

pub(crate) fn text_property(
    ctx: &mut ExecutionContext<'_>,
    name: &str,
) -> Result<String, ExecutionError> {
    match ctx.get_property_value(name, &ValueType::Text)? {
        InternalValue::Text(text) => Ok(text),
        other => Err(invalid(name, &ValueType::Text, &other)),
    }
}

pub(crate) fn integer_property(
    ctx: &mut ExecutionContext<'_>,
    name: &str,
) -> Result<i64, ExecutionError> {
    match ctx.get_property_value(name, &ValueType::Integer)? {
        InternalValue::Integer(i) => Ok(i),
        other => Err(invalid(name, &ValueType::Integer, &other)),
    }
}

pub(crate) fn boolean_property(
    ctx: &mut ExecutionContext<'_>,
    name: &str,
) -> Result<bool, ExecutionError> {
    match ctx.get_property_value(name, &ValueType::Boolean)? {
        InternalValue::Boolean(b) => Ok(b),
        other => Err(invalid(name, &ValueType::Boolean, &other)),
    }
}

pub(crate) fn collection_property(
    ctx: &mut ExecutionContext<'_>,
    name: &str,
    element: ValueType,
) -> Result<Vec<InternalValue>, ExecutionError> {
    let expected = ValueType::collection(element);
    match ctx.get_property_value(name, &expected)? {
        InternalValue::Collection(items) => Ok(items),
        other => Err(invalid(name, &expected, &other)),
    }
}

/// Error for an input the engine should never have routed here
pub(crate) fn unexpected_input(
    ctx: &ExecutionContext<'_>,
    expected: IoType,
    input: &IoValue,
) -> ExecutionError {
    ExecutionError::IoTypeMismatch {
        block: ctx
            .current_block()
            .map(|block| block.name.clone())
            .unwrap_or_default(),
        expected,
        actual: input.io_type(),
    }
}

#[cfg(test)]
mod tests;
