//! Spreadsheet I/O
//!
//! - Read: any calamine-supported workbook → [`SheetGrid`] / [`crate::types::Table`]
//! - Write: processed table + presentation → styled .xlsx

mod reader;
mod writer;

pub use reader::{convert_cell, SheetGrid, SheetReader};
pub use writer::{WorkbookWriter, DEFAULT_FILE_PREFIX, DEFAULT_SHEET_NAME};
