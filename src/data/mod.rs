//! Data exchanged between blocks: files, raw sheets and typed tables

mod cell_range;
mod io;
mod sheet;
mod table;

pub use cell_range::{column_index, column_letters, CellIndex, CellRange, CellRangeError};
pub use io::{mime_type_for_extension, BinaryFile, IoType, IoValue, TextFile};
pub use sheet::Sheet;
pub use table::{Table, TableColumn, TableError};
