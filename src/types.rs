use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Output column that replace rules fill with their project value
pub const PROJECT_COLUMN: &str = "проект";

/// Output column that replace rules fill with their second project value
pub const REQUEST_COLUMN: &str = "Заявка";

pub const DEFAULT_DATE_FORMAT: &str = "DD.MM.YYYY";
pub const DEFAULT_DATE_LOCALE: &str = "ru";

//==============================================================================
// Cells and tables
//==============================================================================

/// A typed spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Empty cells and empty strings are both blank
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Canonical text, or `None` when the trimmed text is empty
    pub fn non_blank_text(&self) -> Option<String> {
        let text = self.to_string();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Canonical string form used for rule matching and width measurement
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// A named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: String, values: Vec<CellValue>) -> Self {
        Self { name, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Canonical text of every cell
    pub fn texts(&self) -> Vec<String> {
        self.values.iter().map(|v| v.to_string()).collect()
    }
}

/// Ordered columns of equal height
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Create an empty table whose columns will hold `row_count` rows
    pub fn new(row_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            row_count,
        }
    }

    /// Build a table from `(name, values)` pairs; the first column sets the height
    pub fn from_columns<N, I>(columns: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<CellValue>)>,
    {
        let mut columns = columns.into_iter().peekable();
        let row_count = columns.peek().map_or(0, |(_, values)| values.len());
        let mut table = Table::new(row_count);
        for (name, values) in columns {
            table.push_column(name.into(), values);
        }
        table
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    /// Values of the column with exactly this name
    pub fn column_values(&self, name: &str) -> Option<&[CellValue]> {
        self.position(name)
            .map(|idx| self.columns[idx].values.as_slice())
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.columns.get(column).and_then(|c| c.values.get(row))
    }

    /// Case-insensitive, whitespace-trimmed lookup; first match wins
    pub fn find_column(&self, name: &str) -> Option<usize> {
        let wanted = normalize_name(name);
        self.columns
            .iter()
            .position(|c| normalize_name(&c.name) == wanted)
    }

    /// Exact, case-sensitive lookup
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Append a column even if one with the same name exists
    pub fn push_column(&mut self, name: String, mut values: Vec<CellValue>) {
        values.resize(self.row_count, CellValue::Empty);
        self.columns.push(Column::new(name, values));
    }

    /// Insert or overwrite by exact name. Returns true if an existing column was replaced.
    pub fn set_column(&mut self, name: String, mut values: Vec<CellValue>) -> bool {
        values.resize(self.row_count, CellValue::Empty);
        match self.position(&name) {
            Some(idx) => {
                self.columns[idx].values = values;
                true
            }
            None => {
                self.columns.push(Column::new(name, values));
                false
            }
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.to_lowercase().trim().to_string()
}

//==============================================================================
// Instruction set
//==============================================================================

/// What a column spec does to produce its output column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAction {
    #[default]
    Copy,
    Create,
}

/// One declared output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub source_name: String,
    pub target_name: String,
    #[serde(default)]
    pub action: ColumnAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_value: Option<String>,
    #[serde(default)]
    pub is_date: bool,
    /// Stored verbatim; unrecognised values render as `DD.MM.YYYY`
    pub date_format: String,
    /// Stored verbatim; unrecognised values use the `ru` month names
    pub date_locale: String,
}

impl ColumnSpec {
    /// Copy `source` into an output column named `target`
    pub fn copy(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_name: source.into(),
            target_name: target.into(),
            action: ColumnAction::Copy,
            fixed_value: None,
            is_date: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_locale: DEFAULT_DATE_LOCALE.to_string(),
        }
    }

    /// Create an output column filled with `fixed_value` (or blanks)
    pub fn create(target: impl Into<String>, fixed_value: Option<&str>) -> Self {
        Self {
            source_name: String::new(),
            target_name: target.into(),
            action: ColumnAction::Create,
            fixed_value: fixed_value.map(str::to_string),
            is_date: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_locale: DEFAULT_DATE_LOCALE.to_string(),
        }
    }

    /// Mark the column as a date column rendered with `format` and `locale`
    pub fn with_date(mut self, format: impl Into<String>, locale: impl Into<String>) -> Self {
        self.is_date = true;
        self.date_format = format.into();
        self.date_locale = locale.into();
        self
    }
}

/// Conditional find/replace with optional side-effect writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceRule {
    /// Output column, matched case-insensitively
    pub column: String,
    pub find_value: String,
    pub replace_value: String,
    /// Written into [`PROJECT_COLUMN`] for matched rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_value: Option<String>,
    /// Written into [`REQUEST_COLUMN`] for matched rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_value2: Option<String>,
}

impl ReplaceRule {
    pub fn new(
        column: impl Into<String>,
        find_value: impl Into<String>,
        replace_value: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            find_value: find_value.into(),
            replace_value: replace_value.into(),
            project_value: None,
            project_value2: None,
        }
    }

    pub fn with_project(mut self, value: impl Into<String>) -> Self {
        self.project_value = Some(value.into());
        self
    }

    pub fn with_request(mut self, value: impl Into<String>) -> Self {
        self.project_value2 = Some(value.into());
        self
    }
}

/// Named formatting options (color values are normalized `RRGGBB`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormattingOptions(BTreeMap<String, String>);

impl FormattingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// Typed result of parsing an instruction workbook.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstructionSet {
    /// Output columns in output order
    pub columns: Vec<ColumnSpec>,
    /// Rules in application order
    pub replace_rules: Vec<ReplaceRule>,
    pub formatting: FormattingOptions,
    /// `email` sheet parameters, except `variables`
    pub email: BTreeMap<String, String>,
    pub email_variables: Vec<String>,
}

//==============================================================================
// Statistics
//==============================================================================

/// Counters reported for one processed file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub processed_rows: usize,
    /// Rules that matched at least one row
    pub applied_rules: usize,
    pub created_columns: usize,
    pub formatted_date_columns: usize,
    /// Rules whose column resolved but matched nothing
    pub unmatched_rules: usize,
    /// Rules whose column is not in the output table
    pub unresolved_rules: usize,
    /// Copy specs whose source column was not in the input table
    pub missing_columns: usize,
}
