//! Styling directives for the output table
//!
//! The directives are plain data; [`crate::excel::WorkbookWriter`] turns them
//! into workbook formats.

use crate::error::{DiagnosticKind, Diagnostics};
use crate::types::{FormattingOptions, Table};
use serde::Serialize;

pub const FONT_NAME: &str = "font_name";
pub const FONT_SIZE: &str = "font_size";
pub const HEADER_BACKGROUND_COLOR: &str = "header_background_color";
pub const HEADER_TEXT_COLOR: &str = "header_text_color";
pub const CELL_BACKGROUND_COLOR: &str = "cell_background_color";

pub const DEFAULT_FONT_NAME: &str = "Calibri";
pub const DEFAULT_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_HEADER_BACKGROUND: &str = "DDDDDD";
pub const DEFAULT_HEADER_TEXT: &str = "000000";
pub const DEFAULT_CELL_BACKGROUND: &str = "FFFFFF";

const WIDTH_PADDING: usize = 2;
const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 50;

/// Formatting used when the instruction workbook has no `formatting` sheet
pub fn default_formatting() -> FormattingOptions {
    FormattingOptions::new()
        .with(FONT_NAME, DEFAULT_FONT_NAME)
        .with(FONT_SIZE, "10")
        .with(HEADER_BACKGROUND_COLOR, DEFAULT_HEADER_BACKGROUND)
        .with(HEADER_TEXT_COLOR, DEFAULT_HEADER_TEXT)
        .with(CELL_BACKGROUND_COLOR, DEFAULT_CELL_BACKGROUND)
}

/// Normalize a color to `RRGGBB`: strip a leading `#`, uppercase, require six hex digits
pub fn normalize_color(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed).to_uppercase();
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hex)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    pub name: String,
    pub size: f64,
    pub bold: bool,
    /// `RRGGBB`; `None` keeps the renderer's default color
    pub color: Option<String>,
}

/// Styling for one output table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    /// Uniform font for data cells
    pub font: FontSpec,
    /// Solid data-cell fill; only set when it is not white
    pub cell_background: Option<String>,
    pub header_font: FontSpec,
    pub header_background: String,
    /// One width per output column, in column order
    pub column_widths: Vec<u16>,
}

impl Presentation {
    /// Derive directives from formatting options and the final table
    pub fn derive(
        formatting: &FormattingOptions,
        table: &Table,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let font_name = formatting
            .get(FONT_NAME)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FONT_NAME)
            .to_string();
        let font_size = font_size(formatting, diagnostics);

        let header_background = color_or(formatting, HEADER_BACKGROUND_COLOR, DEFAULT_HEADER_BACKGROUND);
        let header_text = color_or(formatting, HEADER_TEXT_COLOR, DEFAULT_HEADER_TEXT);
        let cell_background = color_or(formatting, CELL_BACKGROUND_COLOR, DEFAULT_CELL_BACKGROUND);

        Self {
            font: FontSpec {
                name: font_name.clone(),
                size: font_size,
                bold: false,
                color: None,
            },
            cell_background: (cell_background != DEFAULT_CELL_BACKGROUND).then_some(cell_background),
            header_font: FontSpec {
                name: font_name,
                size: font_size,
                bold: true,
                color: Some(header_text),
            },
            header_background,
            column_widths: column_widths(table),
        }
    }
}

fn font_size(formatting: &FormattingOptions, diagnostics: &mut Diagnostics) -> f64 {
    let Some(raw) = formatting.get(FONT_SIZE) else {
        return DEFAULT_FONT_SIZE;
    };
    match raw.trim().parse::<f64>() {
        Ok(size) if size.is_finite() && size > 0.0 => size,
        _ => {
            diagnostics.warn(
                DiagnosticKind::SoftValidation,
                format!("Invalid font size '{}', using {}", raw, DEFAULT_FONT_SIZE),
            );
            DEFAULT_FONT_SIZE
        }
    }
}

fn color_or(formatting: &FormattingOptions, key: &str, default: &str) -> String {
    formatting
        .get(key)
        .and_then(normalize_color)
        .unwrap_or_else(|| default.to_string())
}

/// `clamp(longest text + 2, 10, 50)` per column, header included
pub fn column_widths(table: &Table) -> Vec<u16> {
    table
        .columns()
        .iter()
        .map(|column| {
            let longest = column
                .values
                .iter()
                .map(|v| v.to_string().chars().count())
                .chain(std::iter::once(column.name.chars().count()))
                .max()
                .unwrap_or(0);
            (longest + WIDTH_PADDING).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) as u16
        })
        .collect()
}
