//! Workbook writer: processed table + presentation directives → .xlsx

use crate::core::presentation::Presentation;
use crate::error::{SheetforgeError, SheetforgeResult};
use crate::types::{CellValue, Table};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_SHEET_NAME: &str = "Дислокация";
pub const DEFAULT_FILE_PREFIX: &str = "TRANSFORA_dislocation";

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Renders one output table into a single-sheet workbook
#[derive(Debug, Clone)]
pub struct WorkbookWriter {
    sheet_name: String,
    file_prefix: String,
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME, DEFAULT_FILE_PREFIX)
    }
}

impl WorkbookWriter {
    pub fn new(sheet_name: impl Into<String>, file_prefix: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            file_prefix: file_prefix.into(),
        }
    }

    /// `<prefix>_<YYYY-MM-DD-HH-MM>.xlsx`
    pub fn output_filename(&self, now: NaiveDateTime) -> String {
        format!("{}_{}.xlsx", self.file_prefix, now.format("%Y-%m-%d-%H-%M"))
    }

    /// Render into an in-memory .xlsx document
    pub fn to_buffer(&self, table: &Table, presentation: &Presentation) -> SheetforgeResult<Vec<u8>> {
        let mut workbook = self.build(table, presentation)?;
        workbook
            .save_to_buffer()
            .map_err(|e| SheetforgeError::Export(format!("Failed to render workbook: {}", e)))
    }

    /// Save under a generated filename in `dir` and return the full path
    pub fn save(
        &self,
        table: &Table,
        presentation: &Presentation,
        dir: &Path,
        now: NaiveDateTime,
    ) -> SheetforgeResult<PathBuf> {
        let path = dir.join(self.output_filename(now));
        let mut workbook = self.build(table, presentation)?;
        workbook
            .save(&path)
            .map_err(|e| SheetforgeError::Export(format!("Failed to save Excel file: {}", e)))?;
        info!("Saved output workbook {}", path.display());
        Ok(path)
    }

    fn build(&self, table: &Table, presentation: &Presentation) -> SheetforgeResult<Workbook> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.sheet_name)
            .map_err(|e| SheetforgeError::Export(format!("Failed to set worksheet name: {}", e)))?;

        let formats = CellFormats::new(presentation);

        for (col_idx, column) in table.columns().iter().enumerate() {
            let col = col_idx as u16;
            worksheet
                .write_string_with_format(0, col, &column.name, &formats.header)
                .map_err(|e| SheetforgeError::Export(format!("Failed to write header: {}", e)))?;

            for (row_idx, value) in column.values.iter().enumerate() {
                write_cell(worksheet, row_idx as u32 + 1, col, value, &formats)?;
            }

            if let Some(&width) = presentation.column_widths.get(col_idx) {
                worksheet.set_column_width(col, width).map_err(|e| {
                    SheetforgeError::Export(format!("Failed to set column width: {}", e))
                })?;
            }
        }

        Ok(workbook)
    }
}

/// Formats derived once per workbook
struct CellFormats {
    header: Format,
    cell: Format,
    datetime: Format,
}

impl CellFormats {
    fn new(presentation: &Presentation) -> Self {
        let mut cell = Format::new()
            .set_font_name(presentation.font.name.as_str())
            .set_font_size(presentation.font.size)
            .set_align(FormatAlign::VerticalCenter);
        if let Some(fill) = &presentation.cell_background {
            cell = cell
                .set_pattern(FormatPattern::Solid)
                .set_background_color(rgb(fill));
        }

        let mut header = Format::new()
            .set_font_name(presentation.header_font.name.as_str())
            .set_font_size(presentation.header_font.size)
            .set_pattern(FormatPattern::Solid)
            .set_background_color(rgb(&presentation.header_background))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        if presentation.header_font.bold {
            header = header.set_bold();
        }
        if let Some(color) = &presentation.header_font.color {
            header = header.set_font_color(rgb(color));
        }

        let datetime = cell.clone().set_num_format(DATETIME_FORMAT);

        Self {
            header,
            cell,
            datetime,
        }
    }
}

fn rgb(hex: &str) -> Color {
    Color::RGB(u32::from_str_radix(hex, 16).unwrap_or(0))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    formats: &CellFormats,
) -> SheetforgeResult<()> {
    let result = match value {
        CellValue::Empty => worksheet.write_blank(row, col, &formats.cell),
        CellValue::Text(s) if s.is_empty() => worksheet.write_blank(row, col, &formats.cell),
        CellValue::Text(s) => worksheet.write_string_with_format(row, col, s, &formats.cell),
        CellValue::Int(i) => worksheet.write_number_with_format(row, col, *i as f64, &formats.cell),
        CellValue::Float(f) => worksheet.write_number_with_format(row, col, *f, &formats.cell),
        CellValue::Bool(b) => worksheet.write_boolean_with_format(row, col, *b, &formats.cell),
        CellValue::DateTime(dt) => {
            worksheet.write_datetime_with_format(row, col, dt, &formats.datetime)
        }
    };
    result
        .map(|_| ())
        .map_err(|e| SheetforgeError::Export(format!("Failed to write cell ({}, {}): {}", row, col, e)))
}
