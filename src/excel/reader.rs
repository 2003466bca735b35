//! Workbook reader: in-memory spreadsheet bytes → cell grids and tables

use crate::types::{CellValue, Table};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::Cursor;

/// All cells of one worksheet, positioned from A1
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(CellValue::is_blank))
    }

    /// Convert to a table: first non-blank row is the header, the rest are data
    pub fn to_table(&self) -> Table {
        let mut rows = self
            .rows
            .iter()
            .skip_while(|row| row.iter().all(CellValue::is_blank));

        let Some(header) = rows.next() else {
            return Table::new(0);
        };
        let data: Vec<&Vec<CellValue>> = rows.collect();
        let width = data.iter().map(|r| r.len()).chain([header.len()]).max().unwrap_or(0);

        let mut table = Table::new(data.len());
        for col in 0..width {
            let name = header
                .get(col)
                .and_then(CellValue::non_blank_text)
                .unwrap_or_else(|| format!("col_{}", col));
            let values = data
                .iter()
                .map(|row| row.get(col).cloned().unwrap_or_default())
                .collect();
            table.push_column(name, values);
        }
        table
    }
}

/// Spreadsheet reader over an in-memory document (xlsx, xls, xlsb or ods)
pub struct SheetReader {
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl SheetReader {
    /// Open a workbook; fails if the bytes are not a readable spreadsheet
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, calamine::Error> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        Ok(Self { workbook })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    pub fn grid(&mut self, name: &str) -> Result<SheetGrid, calamine::Error> {
        let range = self.workbook.worksheet_range(name)?;
        Ok(grid_from_range(name, &range))
    }

    /// Read every sheet in workbook order
    pub fn grids(&mut self) -> Result<Vec<SheetGrid>, calamine::Error> {
        self.sheet_names()
            .iter()
            .map(|name| self.grid(name))
            .collect()
    }

    /// Read the first sheet as a table; a workbook without sheets gives an empty table
    pub fn first_table(&mut self) -> Result<(String, Table), calamine::Error> {
        match self.sheet_names().into_iter().next() {
            Some(name) => {
                let grid = self.grid(&name)?;
                Ok((name, grid.to_table()))
            }
            None => Ok((String::new(), Table::new(0))),
        }
    }
}

fn grid_from_range(name: &str, range: &Range<Data>) -> SheetGrid {
    let Some((start_row, start_col)) = range.start() else {
        return SheetGrid::new(name, Vec::new());
    };

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }
    SheetGrid::new(name, rows)
}

/// Map a calamine cell onto [`CellValue`]
pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                CellValue::Float(dt.as_f64())
            } else {
                dt.as_datetime()
                    .map(CellValue::DateTime)
                    .unwrap_or_else(|| CellValue::Float(dt.as_f64()))
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
