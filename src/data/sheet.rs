//! Untyped 2-D grid of decoded cell text

use super::cell_range::{CellIndex, CellRange};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    data: Vec<Vec<String>>,
    width: usize,
    height: usize,
}

impl Sheet {
    pub fn new(data: Vec<Vec<String>>) -> Self {
        let width = data.iter().map(Vec::len).max().unwrap_or(0);
        let height = data.len();
        Self {
            data,
            width,
            height,
        }
    }

    /// Longest observed row
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.data
    }

    /// `None` outside the grid or past the end of a short row
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.data.get(row)?.get(column).map(String::as_str)
    }

    pub fn header_row(&self) -> Option<&[String]> {
        self.data.first().map(Vec::as_slice)
    }

    /// Drop every column selected by one of `ranges`
    pub fn delete_columns(&mut self, ranges: &[CellRange]) {
        let doomed: Vec<usize> = (0..self.width)
            .filter(|column| {
                ranges.iter().any(|range| match range {
                    CellRange::Column(c) => c == column,
                    _ => false,
                })
            })
            .collect();
        for row in &mut self.data {
            for column in doomed.iter().rev() {
                if *column < row.len() {
                    row.remove(*column);
                }
            }
        }
        self.recompute_dimensions();
    }

    /// Drop every row selected by one of `ranges`
    pub fn delete_rows(&mut self, ranges: &[CellRange]) {
        let mut index = 0;
        self.data.retain(|_| {
            let keep = !ranges.iter().any(|range| match range {
                CellRange::Row(r) => *r == index,
                _ => false,
            });
            index += 1;
            keep
        });
        self.recompute_dimensions();
    }

    /// Cells inside `range` in row-major order
    pub fn select(&self, range: &CellRange) -> Vec<&str> {
        let mut selected = Vec::new();
        for (row_index, row) in self.data.iter().enumerate() {
            for (column_index, cell) in row.iter().enumerate() {
                if range.contains(CellIndex::new(column_index, row_index)) {
                    selected.push(cell.as_str());
                }
            }
        }
        selected
    }

    fn recompute_dimensions(&mut self) {
        self.width = self.data.iter().map(Vec::len).max().unwrap_or(0);
        self.height = self.data.len();
    }
}
