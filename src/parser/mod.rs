//! Instruction workbook parser
//!
//! An instruction workbook is a small spreadsheet authored by hand. It
//! declares the output columns (`columns`), find/replace rules (`replace`),
//! notification template parameters (`email`) and output styling
//! (`formatting`). Every sheet is optional; only a document that cannot be
//! opened at all is an error.

pub mod validation;

use crate::core::presentation::{default_formatting, normalize_color};
use crate::error::{DiagnosticKind, Diagnostics, SheetforgeError, SheetforgeResult};
use crate::excel::{SheetGrid, SheetReader};
use crate::types::{
    CellValue, ColumnAction, ColumnSpec, FormattingOptions, InstructionSet, ReplaceRule,
    DEFAULT_DATE_FORMAT, DEFAULT_DATE_LOCALE,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

pub const COLUMNS_SHEET: &str = "columns";
pub const REPLACE_SHEET: &str = "replace";
pub const EMAIL_SHEET: &str = "email";
pub const FORMATTING_SHEET: &str = "formatting";

/// Reserved `email` parameter holding a comma-separated variable list
pub const VARIABLES_KEY: &str = "variables";

/// Values accepted as "true" in the `is_date` column
const TRUTHY: [&str; 5] = ["true", "1", "да", "yes", "y"];

/// An instruction set together with the warnings raised while building it
#[derive(Debug, Clone, Default)]
pub struct ParsedInstructions {
    pub instructions: InstructionSet,
    pub diagnostics: Diagnostics,
}

/// Parse an instruction workbook held in memory.
///
/// Missing or malformed sheets degrade to empty sections or defaults and are
/// recorded in [`ParsedInstructions::diagnostics`].
///
/// # Errors
/// [`SheetforgeError::Parse`] when the bytes are not a readable spreadsheet.
///
/// # Example
/// ```no_run
/// use sheetforge::parser::parse_instructions;
///
/// let bytes = std::fs::read("instructions.xlsx")?;
/// let parsed = parse_instructions(&bytes)?;
/// println!("Columns: {}", parsed.instructions.columns.len());
/// println!("Rules: {}", parsed.instructions.replace_rules.len());
/// # Ok::<(), sheetforge::error::SheetforgeError>(())
/// ```
pub fn parse_instructions(bytes: &[u8]) -> SheetforgeResult<ParsedInstructions> {
    let mut reader = SheetReader::from_bytes(bytes).map_err(|e| {
        SheetforgeError::Parse(format!("Failed to open instruction workbook: {}", e))
    })?;
    let sheets = reader
        .grids()
        .map_err(|e| SheetforgeError::Parse(format!("Failed to read instruction sheet: {}", e)))?;

    Ok(parse_workbook(&sheets))
}

/// Read and parse an instruction workbook from disk
pub fn parse_instruction_file(path: &Path) -> SheetforgeResult<ParsedInstructions> {
    let bytes = std::fs::read(path)?;
    info!("Parsing instruction workbook {}", path.display());
    parse_instructions(&bytes)
}

/// Build an instruction set from already-read sheets
pub fn parse_workbook(sheets: &[SheetGrid]) -> ParsedInstructions {
    let mut diagnostics = Diagnostics::new();
    let mut instructions = InstructionSet::default();

    match find_sheet(sheets, COLUMNS_SHEET) {
        Some(sheet) => {
            instructions.columns = parse_columns_sheet(sheet, &mut diagnostics);
            info!("Loaded {} column specs", instructions.columns.len());
            if instructions.columns.is_empty() {
                empty_section(COLUMNS_SHEET, &mut diagnostics);
            }
        }
        None => missing_sheet(COLUMNS_SHEET, &mut diagnostics),
    }

    match find_sheet(sheets, REPLACE_SHEET) {
        Some(sheet) => {
            instructions.replace_rules = parse_replace_sheet(sheet);
            info!("Loaded {} replace rules", instructions.replace_rules.len());
            if instructions.replace_rules.is_empty() {
                empty_section(REPLACE_SHEET, &mut diagnostics);
            }
        }
        None => missing_sheet(REPLACE_SHEET, &mut diagnostics),
    }

    match find_sheet(sheets, EMAIL_SHEET) {
        Some(sheet) => {
            let (email, variables) = parse_email_sheet(sheet);
            instructions.email = email;
            instructions.email_variables = variables;
            info!("Loaded {} email parameters", instructions.email.len());
            if instructions.email.is_empty() && instructions.email_variables.is_empty() {
                empty_section(EMAIL_SHEET, &mut diagnostics);
            }
        }
        None => missing_sheet(EMAIL_SHEET, &mut diagnostics),
    }

    instructions.formatting = match find_sheet(sheets, FORMATTING_SHEET) {
        Some(sheet) => parse_formatting_sheet(sheet, &mut diagnostics),
        None => {
            info!("No '{}' sheet, using default formatting", FORMATTING_SHEET);
            default_formatting()
        }
    };

    validation::validate(&instructions, &mut diagnostics);

    ParsedInstructions {
        instructions,
        diagnostics,
    }
}

/// Sheet names match case-insensitively, ignoring surrounding whitespace
fn find_sheet<'a>(sheets: &'a [SheetGrid], name: &str) -> Option<&'a SheetGrid> {
    sheets
        .iter()
        .find(|sheet| sheet.name.trim().eq_ignore_ascii_case(name))
}

fn missing_sheet(name: &str, diagnostics: &mut Diagnostics) {
    diagnostics.warn(
        DiagnosticKind::SoftValidation,
        format!("Sheet '{}' not found; section left empty", name),
    );
}

fn empty_section(name: &str, diagnostics: &mut Diagnostics) {
    diagnostics.warn(
        DiagnosticKind::SoftValidation,
        format!("Sheet '{}' has no usable rows", name),
    );
}

//==============================================================================
// columns
//==============================================================================

/// Recognized fields of the `columns` sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ColumnField {
    Source,
    Target,
    Action,
    Value,
    DateFormat,
    IsDate,
    DateLocale,
}

impl ColumnField {
    /// Positional index used when no header names the field
    fn fallback_index(self) -> Option<usize> {
        match self {
            ColumnField::Source => Some(0),
            ColumnField::Target => Some(1),
            ColumnField::Action => Some(2),
            ColumnField::Value => Some(3),
            _ => None,
        }
    }

    /// Classify a lowercased, trimmed header; first matching rule wins
    fn classify(header: &str) -> Option<Self> {
        let has = |needle: &str| header.contains(needle);
        if has("source") {
            Some(ColumnField::Source)
        } else if has("target") {
            Some(ColumnField::Target)
        } else if header == "action" {
            Some(ColumnField::Action)
        } else if header == "value" {
            Some(ColumnField::Value)
        } else if has("date") && has("format") {
            Some(ColumnField::DateFormat)
        } else if header == "is_date" || (has("date") && (has("is") || has("flag"))) {
            Some(ColumnField::IsDate)
        } else if has("locale") {
            Some(ColumnField::DateLocale)
        } else {
            None
        }
    }
}

/// Header → column index mapping for the `columns` sheet
#[derive(Debug, Default)]
struct HeaderMap(HashMap<ColumnField, usize>);

impl HeaderMap {
    /// Later headers for the same field override earlier ones
    fn from_row(row: &[CellValue]) -> Self {
        let mut map = HashMap::new();
        for (idx, cell) in row.iter().enumerate() {
            let Some(header) = cell.non_blank_text() else {
                continue;
            };
            if let Some(field) = ColumnField::classify(&header.trim().to_lowercase()) {
                map.insert(field, idx);
            }
        }
        HeaderMap(map)
    }

    /// Mapped index, else the positional fallback unless another header claimed it
    fn index(&self, field: ColumnField) -> Option<usize> {
        self.0.get(&field).copied().or_else(|| {
            field
                .fallback_index()
                .filter(|idx| !self.0.values().any(|claimed| claimed == idx))
        })
    }

    fn text(&self, row: &[CellValue], field: ColumnField) -> Option<String> {
        self.index(field).and_then(|idx| text_at(row, idx))
    }

    fn cell<'r>(&self, row: &'r [CellValue], field: ColumnField) -> Option<&'r CellValue> {
        self.index(field).and_then(|idx| row.get(idx))
    }
}

fn parse_columns_sheet(sheet: &SheetGrid, diagnostics: &mut Diagnostics) -> Vec<ColumnSpec> {
    let Some((header, rows)) = sheet.rows.split_first() else {
        return Vec::new();
    };
    let headers = HeaderMap::from_row(header);
    debug!("Column sheet header mapping: {:?}", headers.0);

    rows.iter()
        .filter_map(|row| parse_column_row(row, &headers, diagnostics))
        .collect()
}

fn parse_column_row(
    row: &[CellValue],
    headers: &HeaderMap,
    diagnostics: &mut Diagnostics,
) -> Option<ColumnSpec> {
    let source_name = headers.text(row, ColumnField::Source)?.trim().to_string();
    let target_name = headers
        .text(row, ColumnField::Target)
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| source_name.clone());

    let action = match headers.text(row, ColumnField::Action) {
        None => ColumnAction::Copy,
        Some(raw) => parse_action(&raw).unwrap_or_else(|| {
            diagnostics.warn(
                DiagnosticKind::SoftValidation,
                format!(
                    "Unknown action '{}' for column '{}'; treated as copy",
                    raw.trim(),
                    target_name
                ),
            );
            ColumnAction::Copy
        }),
    };

    let is_date = headers
        .cell(row, ColumnField::IsDate)
        .is_some_and(parse_bool_flag);

    let spec = ColumnSpec {
        source_name,
        target_name,
        action,
        fixed_value: headers.text(row, ColumnField::Value),
        is_date,
        date_format: headers
            .text(row, ColumnField::DateFormat)
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
        date_locale: headers
            .text(row, ColumnField::DateLocale)
            .unwrap_or_else(|| DEFAULT_DATE_LOCALE.to_string()),
    };

    if spec.is_date {
        info!(
            "Date column '{}' -> '{}' ({}, {})",
            spec.source_name, spec.target_name, spec.date_format, spec.date_locale
        );
    }
    Some(spec)
}

fn parse_action(raw: &str) -> Option<ColumnAction> {
    match raw.trim().to_lowercase().as_str() {
        "copy" => Some(ColumnAction::Copy),
        "create" => Some(ColumnAction::Create),
        _ => None,
    }
}

/// Permissive boolean: `true`, `1`, `да`, `yes`, `y` (any case) are true
pub fn parse_bool_flag(cell: &CellValue) -> bool {
    match cell {
        CellValue::Bool(b) => *b,
        other => {
            let text = other.to_string().trim().to_lowercase();
            TRUTHY.contains(&text.as_str())
        }
    }
}

//==============================================================================
// replace / email / formatting
//==============================================================================

/// Positional: column, find, replace, project, request. The first three are required.
fn parse_replace_sheet(sheet: &SheetGrid) -> Vec<ReplaceRule> {
    sheet
        .rows
        .iter()
        .skip(1)
        .filter_map(|row| {
            let column = text_at(row, 0)?;
            let find_value = text_at(row, 1)?;
            let replace_value = text_at(row, 2)?;
            Some(ReplaceRule {
                column,
                find_value,
                replace_value,
                project_value: text_at(row, 3),
                project_value2: text_at(row, 4),
            })
        })
        .collect()
}

fn parse_email_sheet(sheet: &SheetGrid) -> (BTreeMap<String, String>, Vec<String>) {
    let mut email = BTreeMap::new();
    let mut variables = Vec::new();

    for row in sheet.rows.iter().skip(1) {
        let (Some(name), Some(value)) = (text_at(row, 0), text_at(row, 1)) else {
            continue;
        };
        let name = name.trim().to_string();
        if name == VARIABLES_KEY {
            variables = value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            info!("Email variables: {:?}", variables);
        } else {
            email.insert(name, value);
        }
    }

    (email, variables)
}

fn parse_formatting_sheet(sheet: &SheetGrid, diagnostics: &mut Diagnostics) -> FormattingOptions {
    let mut formatting = FormattingOptions::new();

    for row in sheet.rows.iter().skip(1) {
        let (Some(name), Some(value)) = (text_at(row, 0), text_at(row, 1)) else {
            continue;
        };
        let name = name.trim().to_string();
        if name.to_lowercase().contains("color") {
            match normalize_color(&value) {
                Some(color) => formatting.insert(name, color),
                None => diagnostics.warn(
                    DiagnosticKind::SoftValidation,
                    format!("Invalid color '{}' for '{}'; default used", value, name),
                ),
            }
        } else {
            formatting.insert(name, value.trim());
        }
    }

    info!("Loaded {} formatting options", formatting.len());
    formatting
}

/// Canonical text of the cell at `idx`, or `None` if absent or blank
fn text_at(row: &[CellValue], idx: usize) -> Option<String> {
    row.get(idx).and_then(CellValue::non_blank_text)
}
