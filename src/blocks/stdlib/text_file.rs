use async_trait::async_trait;

use super::{text_property, unexpected_input};
use crate::blocks::{BlockExecutor, BlockExecutorClass, BlockOutcome};
use crate::data::{IoType, IoValue, TextFile};
use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::{InternalValue, RegexValue, ValueType};

/// Decodes a binary file into lines of text
pub struct TextFileInterpreter;

pub(super) fn class() -> BlockExecutorClass {
    let line_break = RegexValue::new(r"\r?\n").map(InternalValue::Regex).ok();
    BlockExecutorClass {
        block_type: "TextFileInterpreter",
        input_type: IoType::File,
        output_type: IoType::TextFile,
        property_specs: vec![
            PropertySpec::with_default(
                "encoding",
                ValueType::Text,
                InternalValue::text("utf-8"),
                "Character encoding: utf-8, ascii or latin1",
            ),
            PropertySpec {
                name: "lineBreak",
                value_type: ValueType::Regex,
                default_value: line_break,
                optional: false,
                docs: "Pattern separating lines",
            },
        ],
        factory,
    }
}

fn factory() -> Box<dyn BlockExecutor> {
    Box::new(TextFileInterpreter)
}

#[async_trait]
impl BlockExecutor for TextFileInterpreter {
    async fn execute(
        &self,
        input: IoValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<BlockOutcome, ExecutionError> {
        let IoValue::File(file) = input else {
            return Err(unexpected_input(ctx, IoType::File, &input));
        };
        let encoding = text_property(ctx, "encoding")?;
        let line_break = match ctx.get_property_value("lineBreak", &ValueType::Regex)? {
            InternalValue::Regex(regex) => regex,
            other => {
                return Err(ExecutionError::InvalidPropertyValue {
                    property: "lineBreak".to_string(),
                    expected: ValueType::Regex.to_string(),
                    message: format!("got {} '{}'", other.kind_name(), other),
                })
            }
        };

        let Some(text) = decode(&file.content, &encoding) else {
            ctx.log_error(
                format!("Unsupported encoding '{}'", encoding),
                Some("Use one of utf-8, ascii or latin1"),
            );
            return Ok(BlockOutcome::HandledFailure);
        };

        let mut lines: Vec<String> = line_break
            .regex()
            .split(&text)
            .map(str::to_string)
            .collect();
        if lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        ctx.log_debug(format!("Decoded {} lines", lines.len()));

        Ok(BlockOutcome::Produced(IoValue::TextFile(TextFile {
            name: file.name,
            extension: file.extension,
            mime_type: file.mime_type,
            lines,
        })))
    }
}

/// Decode `bytes`; `None` for an unsupported encoding. Invalid sequences
/// become U+FFFD.
pub fn decode(bytes: &[u8], encoding: &str) -> Option<String> {
    match encoding.trim().to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        "ascii" | "us-ascii" => Some(
            bytes
                .iter()
                .map(|b| {
                    if b.is_ascii() {
                        *b as char
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        ),
        "latin1" | "latin-1" | "iso-8859-1" => Some(bytes.iter().map(|b| *b as char).collect()),
        _ => None,
    }
}
