//! Spreadsheet selectors: `B3`, `A1:C4`, `row 2`, `column C`
//!
//! Indices are zero-based internally and one-based / lettered in text.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cell range '{0}'")]
pub struct CellRangeError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellIndex {
    pub row: usize,
    pub column: usize,
}

impl CellIndex {
    pub fn new(column: usize, row: usize) -> Self {
        Self { row, column }
    }

    fn parse(s: &str) -> Option<Self> {
        let split = s.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = s.split_at(split);
        let column = column_index(letters)?;
        let row: usize = digits.parse().ok()?;
        row.checked_sub(1).map(|row| CellIndex { row, column })
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRange {
    Cell(CellIndex),
    Row(usize),
    Column(usize),
    Range { from: CellIndex, to: CellIndex },
}

impl CellRange {
    pub fn parse(selector: &str) -> Result<Self, CellRangeError> {
        let invalid = || CellRangeError(selector.to_string());
        let trimmed = selector.trim();
        let lower = trimmed.to_ascii_lowercase();

        if let Some(rest) = lower.strip_prefix("row ") {
            let row: usize = rest.trim().parse().map_err(|_| invalid())?;
            return row.checked_sub(1).map(CellRange::Row).ok_or_else(invalid);
        }
        if let Some(rest) = lower.strip_prefix("column ") {
            return column_index(rest.trim())
                .map(CellRange::Column)
                .ok_or_else(invalid);
        }
        if let Some((from, to)) = trimmed.split_once(':') {
            let from = CellIndex::parse(from.trim()).ok_or_else(invalid)?;
            let to = CellIndex::parse(to.trim()).ok_or_else(invalid)?;
            if from.row > to.row || from.column > to.column {
                return Err(invalid());
            }
            return Ok(CellRange::Range { from, to });
        }
        CellIndex::parse(trimmed)
            .map(CellRange::Cell)
            .ok_or_else(invalid)
    }

    pub fn contains(&self, index: CellIndex) -> bool {
        match self {
            CellRange::Cell(cell) => *cell == index,
            CellRange::Row(row) => *row == index.row,
            CellRange::Column(column) => *column == index.column,
            CellRange::Range { from, to } => {
                (from.row..=to.row).contains(&index.row)
                    && (from.column..=to.column).contains(&index.column)
            }
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRange::Cell(cell) => write!(f, "{}", cell),
            CellRange::Row(row) => write!(f, "row {}", row + 1),
            CellRange::Column(column) => write!(f, "column {}", column_letters(*column)),
            CellRange::Range { from, to } => write!(f, "{}:{}", from, to),
        }
    }
}

/// `A` → 0, `Z` → 25, `AA` → 26
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters.chars().try_fold(0usize, |acc, c| {
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })
    .map(|n| n - 1)
}

pub fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}
