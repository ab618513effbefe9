//! Delimited-text parsing into sheets
//!
//! Enclosed fields may contain the delimiter, line breaks and escaped
//! enclosing characters. Blank lines are skipped.

use async_trait::async_trait;
use thiserror::Error;

use super::{text_property, unexpected_input};
use crate::blocks::{BlockExecutor, BlockExecutorClass, BlockOutcome};
use crate::data::{IoType, IoValue, Sheet};
use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::{InternalValue, ValueType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    #[error("Delimiter must be exactly one character, got '{0}'")]
    InvalidDelimiter(String),
    #[error("Enclosing character must be empty or one character, got '{0}'")]
    InvalidEnclosing(String),
    #[error("Escape character must be empty or one character, got '{0}'")]
    InvalidEscape(String),
    #[error("Unterminated enclosed field starting on line {0}")]
    UnterminatedField(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: char,
    pub enclosing: Option<char>,
    pub escape: Option<char>,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            enclosing: Some('"'),
            escape: Some('"'),
        }
    }
}

impl CsvDialect {
    pub fn from_properties(
        delimiter: &str,
        enclosing: &str,
        escape: &str,
    ) -> Result<Self, CsvError> {
        let delimiter = single_char(delimiter)
            .flatten()
            .ok_or_else(|| CsvError::InvalidDelimiter(delimiter.to_string()))?;
        let enclosing_char =
            single_char(enclosing).ok_or_else(|| CsvError::InvalidEnclosing(enclosing.to_string()))?;
        let escape_char =
            single_char(escape).ok_or_else(|| CsvError::InvalidEscape(escape.to_string()))?;
        Ok(Self {
            delimiter,
            enclosing: enclosing_char,
            escape: escape_char,
        })
    }
}

/// `Some(None)` for the empty string, `None` for two or more characters
fn single_char(s: &str) -> Option<Option<char>> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Some(None),
        (Some(c), None) => Some(Some(c)),
        _ => None,
    }
}

pub fn parse_csv(text: &str, dialect: CsvDialect) -> Result<Vec<Vec<String>>, CsvError> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_enclosure = false;
    let mut was_enclosed = false;
    let mut line = 1;
    let mut enclosure_line = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_enclosure {
            if Some(c) == dialect.escape
                && dialect.escape != dialect.enclosing
                && chars.peek().copied() == dialect.enclosing
            {
                if let Some(enclosing) = chars.next() {
                    field.push(enclosing);
                }
            } else if Some(c) == dialect.enclosing {
                if dialect.escape == dialect.enclosing && chars.peek() == Some(&c) {
                    chars.next();
                    field.push(c);
                } else {
                    in_enclosure = false;
                }
            } else {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
            continue;
        }

        match c {
            c if Some(c) == dialect.enclosing && field.is_empty() && !was_enclosed => {
                in_enclosure = true;
                was_enclosed = true;
                enclosure_line = line;
            }
            c if c == dialect.delimiter => {
                row.push(std::mem::take(&mut field));
                was_enclosed = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                finish_row(&mut rows, &mut row, &mut field, was_enclosed);
                was_enclosed = false;
            }
            c => field.push(c),
        }
    }

    if in_enclosure {
        return Err(CsvError::UnterminatedField(enclosure_line));
    }
    finish_row(&mut rows, &mut row, &mut field, was_enclosed);
    Ok(rows)
}

fn finish_row(
    rows: &mut Vec<Vec<String>>,
    row: &mut Vec<String>,
    field: &mut String,
    was_enclosed: bool,
) {
    if row.is_empty() && field.is_empty() && !was_enclosed {
        return;
    }
    row.push(std::mem::take(field));
    rows.push(std::mem::take(row));
}

pub struct CsvInterpreter;

pub(super) fn class() -> BlockExecutorClass {
    BlockExecutorClass {
        block_type: "CSVInterpreter",
        input_type: IoType::TextFile,
        output_type: IoType::Sheet,
        property_specs: vec![
            PropertySpec::with_default(
                "delimiter",
                ValueType::Text,
                InternalValue::text(","),
                "Field separator",
            ),
            PropertySpec::with_default(
                "enclosing",
                ValueType::Text,
                InternalValue::text("\""),
                "Character enclosing fields; empty disables enclosing",
            ),
            PropertySpec::with_default(
                "enclosingEscape",
                ValueType::Text,
                InternalValue::text("\""),
                "Character escaping the enclosing character inside a field",
            ),
        ],
        factory,
    }
}

fn factory() -> Box<dyn BlockExecutor> {
    Box::new(CsvInterpreter)
}

#[async_trait]
impl BlockExecutor for CsvInterpreter {
    async fn execute(
        &self,
        input: IoValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<BlockOutcome, ExecutionError> {
        let IoValue::TextFile(file) = input else {
            return Err(unexpected_input(ctx, IoType::TextFile, &input));
        };
        let delimiter = text_property(ctx, "delimiter")?;
        let enclosing = text_property(ctx, "enclosing")?;
        let escape = text_property(ctx, "enclosingEscape")?;

        let parsed = CsvDialect::from_properties(&delimiter, &enclosing, &escape)
            .and_then(|dialect| parse_csv(&file.lines.join("\n"), dialect));
        match parsed {
            Ok(rows) => {
                let sheet = Sheet::new(rows);
                ctx.log_debug(format!(
                    "Parsed {} rows and {} columns",
                    sheet.height(),
                    sheet.width()
                ));
                Ok(BlockOutcome::Produced(IoValue::Sheet(sheet)))
            }
            Err(e) => {
                ctx.log_error(format!("Could not parse '{}': {}", file.name, e), None);
                Ok(BlockOutcome::HandledFailure)
            }
        }
    }
}
