use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub type SheetforgeResult<T> = Result<T, SheetforgeError>;

/// Fatal errors. Anything recoverable is a [`Diagnostic`] instead.
#[derive(Error, Debug)]
pub enum SheetforgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The instruction document could not be opened or read at all.
    #[error("Instruction parse failure: {0}")]
    Parse(String),

    /// The data workbook could not be opened or read.
    #[error("Import error: {0}")]
    Import(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//==============================================================================
// Soft conditions
//==============================================================================

/// Category of a recoverable condition recorded during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Missing sheet, unknown date format or locale, missing subject, bad color
    SoftValidation,
    /// A configured source or rule column is absent from the working table
    ColumnResolutionMiss,
    /// A date cell could not be parsed and was kept as text
    DateParseDegradation,
}

impl DiagnosticKind {
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::SoftValidation => "validation",
            DiagnosticKind::ColumnResolutionMiss => "column-miss",
            DiagnosticKind::DateParseDegradation => "date-degraded",
        }
    }
}

/// A single recorded warning
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.message)
    }
}

/// Warning trail of one parse or processing run.
///
/// Every recorded entry is also emitted through `tracing::warn!`, so callers
/// that only look at logs see the same trail as callers that inspect the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(kind = kind.label(), "{}", message);
        self.0.push(Diagnostic { kind, message });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries of the given kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.0.iter().filter(|d| d.kind == kind).count()
    }

    /// True if any entry of `kind` mentions `needle`
    pub fn mentions(&self, kind: DiagnosticKind, needle: &str) -> bool {
        self.0
            .iter()
            .any(|d| d.kind == kind && d.message.contains(needle))
    }
}
