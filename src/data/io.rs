//! Values exchanged between blocks along pipes

use std::fmt;
use std::path::Path;

use super::{Sheet, Table};

/// Kind of value a block consumes or produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoType {
    None,
    File,
    TextFile,
    Sheet,
    Table,
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IoType::None => "None",
            IoType::File => "File",
            IoType::TextFile => "TextFile",
            IoType::Sheet => "Sheet",
            IoType::Table => "Table",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IoValue {
    None,
    File(BinaryFile),
    TextFile(TextFile),
    Sheet(Sheet),
    Table(Table),
}

impl IoValue {
    pub fn io_type(&self) -> IoType {
        match self {
            IoValue::None => IoType::None,
            IoValue::File(_) => IoType::File,
            IoValue::TextFile(_) => IoType::TextFile,
            IoValue::Sheet(_) => IoType::Sheet,
            IoValue::Table(_) => IoType::Table,
        }
    }

    /// One-line description for debug output
    pub fn summary(&self) -> String {
        match self {
            IoValue::None => "no value".to_string(),
            IoValue::File(file) => format!(
                "file '{}' ({}, {} bytes)",
                file.name,
                file.mime_type,
                file.content.len()
            ),
            IoValue::TextFile(file) => {
                format!("text file '{}' with {} lines", file.name, file.lines.len())
            }
            IoValue::Sheet(sheet) => format!(
                "sheet with {} rows and {} columns",
                sheet.height(),
                sheet.width()
            ),
            IoValue::Table(table) => format!(
                "table with {} rows and {} columns",
                table.number_of_rows(),
                table.number_of_columns()
            ),
        }
    }

    /// Leading content lines, at most `limit`
    pub fn preview(&self, limit: usize) -> Vec<String> {
        match self {
            IoValue::None | IoValue::File(_) => Vec::new(),
            IoValue::TextFile(file) => file.lines.iter().take(limit).cloned().collect(),
            IoValue::Sheet(sheet) => sheet
                .rows()
                .iter()
                .take(limit)
                .map(|row| row.join(" | "))
                .collect(),
            IoValue::Table(table) => {
                let header = table
                    .columns()
                    .iter()
                    .map(|c| format!("{} ({})", c.name, c.value_type))
                    .collect::<Vec<_>>()
                    .join(" | ");
                std::iter::once(header)
                    .chain(table.rows().take(limit).map(|row| {
                        row.iter()
                            .map(|v| v.to_display_string())
                            .collect::<Vec<_>>()
                            .join(" | ")
                    }))
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryFile {
    pub name: String,
    pub extension: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl BinaryFile {
    /// Name, extension and MIME type derived from `path`
    pub fn from_path(path: &Path, content: Vec<u8>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let mime_type = mime_type_for_extension(&extension).to_string();
        Self {
            name,
            extension,
            mime_type,
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextFile {
    pub name: String,
    pub extension: String,
    pub mime_type: String,
    pub lines: Vec<String>,
}

pub fn mime_type_for_extension(extension: &str) -> &'static str {
    match extension {
        "csv" => "text/csv",
        "txt" => "text/plain",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
