//! One processing run: projection → replace rules → presentation

use crate::core::presentation::Presentation;
use crate::core::projector::ColumnProjector;
use crate::core::replace::ReplaceEngine;
use crate::error::{Diagnostics, SheetforgeError, SheetforgeResult};
use crate::excel::SheetReader;
use crate::types::{InstructionSet, Statistics, Table};
use serde::Serialize;
use tracing::info;

/// Everything a run produces for one input file
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingOutcome {
    #[serde(skip)]
    pub table: Table,
    pub presentation: Presentation,
    pub statistics: Statistics,
    pub diagnostics: Diagnostics,
}

/// Applies one instruction set to input tables.
///
/// Holds no mutable state, so one processor can serve any number of runs.
pub struct Processor<'a> {
    instructions: &'a InstructionSet,
}

impl<'a> Processor<'a> {
    pub fn new(instructions: &'a InstructionSet) -> Self {
        Self { instructions }
    }

    pub fn process(&self, input: &Table) -> ProcessingOutcome {
        let mut diagnostics = Diagnostics::new();

        let projection =
            ColumnProjector::new(&self.instructions.columns).project(input, &mut diagnostics);
        let mut table = projection.table;

        let summary =
            ReplaceEngine::new(&self.instructions.replace_rules).apply(&mut table, &mut diagnostics);

        let presentation =
            Presentation::derive(&self.instructions.formatting, &table, &mut diagnostics);

        let statistics = Statistics {
            processed_rows: input.row_count(),
            applied_rules: summary.applied(),
            created_columns: projection.created_columns,
            formatted_date_columns: projection.formatted_date_columns,
            unmatched_rules: summary.unmatched(),
            unresolved_rules: summary.unresolved(),
            missing_columns: projection.missing_columns,
        };

        info!(
            "Processed {} rows: {} rules applied, {} columns created, {} date columns formatted",
            statistics.processed_rows,
            statistics.applied_rules,
            statistics.created_columns,
            statistics.formatted_date_columns
        );

        ProcessingOutcome {
            table,
            presentation,
            statistics,
            diagnostics,
        }
    }

    /// Read the first sheet of a workbook and process it
    pub fn process_bytes(
        &self,
        bytes: &[u8],
        source_filename: &str,
    ) -> SheetforgeResult<ProcessingOutcome> {
        let mut reader = SheetReader::from_bytes(bytes).map_err(|e| {
            SheetforgeError::Import(format!("Failed to open '{}': {}", source_filename, e))
        })?;
        let (sheet, input) = reader.first_table().map_err(|e| {
            SheetforgeError::Import(format!("Failed to read '{}': {}", source_filename, e))
        })?;

        info!(
            "Read '{}' (sheet '{}'): {} rows, {} columns",
            source_filename,
            sheet,
            input.row_count(),
            input.column_count()
        );
        Ok(self.process(&input))
    }
}
