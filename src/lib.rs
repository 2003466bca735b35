//! Sheetforge - instruction-driven spreadsheet transformation
//!
//! A data workbook with an arbitrary layout is rebuilt according to an
//! instruction workbook authored by hand.
//!
//! # Features
//!
//! - Column projection with case-insensitive source lookup
//! - Locale-aware date reformatting (Russian and English month names)
//! - Ordered find/replace rules with project and request side-effect columns
//! - Styled .xlsx output (fonts, fills, column widths)
//! - Result notification rendering from templates
//!
//! Recoverable problems never fail a run; they are collected as
//! [`error::Diagnostics`].
//!
//! # Example
//!
//! ```no_run
//! use sheetforge::core::Processor;
//! use sheetforge::parser::parse_instructions;
//!
//! let parsed = parse_instructions(&std::fs::read("instructions.xlsx")?)?;
//! let outcome = Processor::new(&parsed.instructions)
//!     .process_bytes(&std::fs::read("dislocation.xlsx")?, "dislocation.xlsx")?;
//!
//! println!("Rows: {}", outcome.statistics.processed_rows);
//! println!("Rules applied: {}", outcome.statistics.applied_rules);
//! # Ok::<(), sheetforge::error::SheetforgeError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod parser;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use error::{Diagnostic, DiagnosticKind, Diagnostics, SheetforgeError, SheetforgeResult};
pub use types::{CellValue, ColumnSpec, InstructionSet, ReplaceRule, Statistics, Table};
