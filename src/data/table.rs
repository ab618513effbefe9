//! Columnar table with per-column value types
//!
//! A table is built with a fixed row count and filled one column at a time.
//! Every column holds exactly `number_of_rows` values.

use thiserror::Error;

use crate::valuetypes::{InternalValue, ValueType};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("column '{column}' has {actual} values, table has {expected} rows")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("table already has a column named '{0}'")]
    DuplicateColumn(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub value_type: ValueType,
    pub values: Vec<InternalValue>,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, value_type: ValueType, values: Vec<InternalValue>) -> Self {
        Self {
            name: name.into(),
            value_type,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    number_of_rows: usize,
    columns: Vec<TableColumn>,
}

impl Table {
    pub fn new(number_of_rows: usize) -> Self {
        Self {
            number_of_rows,
            columns: Vec::new(),
        }
    }

    pub fn number_of_rows(&self) -> usize {
        self.number_of_rows
    }

    pub fn number_of_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn add_column(&mut self, column: TableColumn) -> Result<(), TableError> {
        if column.values.len() != self.number_of_rows {
            return Err(TableError::ColumnLengthMismatch {
                column: column.name,
                expected: self.number_of_rows,
                actual: column.values.len(),
            });
        }
        if self.column(&column.name).is_some() {
            return Err(TableError::DuplicateColumn(column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Cells of one row in column order
    pub fn row(&self, index: usize) -> Option<Vec<&InternalValue>> {
        if index >= self.number_of_rows {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&InternalValue>> + '_ {
        (0..self.number_of_rows).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// New table holding only the rows where `keep[i]` is true
    pub fn retain_rows(self, keep: &[bool]) -> Table {
        let kept = keep
            .iter()
            .take(self.number_of_rows)
            .filter(|k| **k)
            .count();
        let columns = self
            .columns
            .into_iter()
            .map(|column| TableColumn {
                values: column
                    .values
                    .into_iter()
                    .zip(keep)
                    .filter_map(|(value, keep)| keep.then_some(value))
                    .collect(),
                ..column
            })
            .collect();
        Table {
            number_of_rows: kept,
            columns,
        }
    }

    /// Replace a column of the same name, or append it
    pub fn put_column(&mut self, column: TableColumn) -> Result<(), TableError> {
        if column.values.len() != self.number_of_rows {
            return Err(TableError::ColumnLengthMismatch {
                column: column.name,
                expected: self.number_of_rows,
                actual: column.values.len(),
            });
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }
}
