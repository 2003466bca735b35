//! Column projection: input table + column specs → output table

use crate::core::dates::DateFormatter;
use crate::error::{DiagnosticKind, Diagnostics};
use crate::types::{CellValue, ColumnAction, ColumnSpec, Table, PROJECT_COLUMN};
use tracing::{debug, info};

/// Output of a projection pass
#[derive(Debug, Clone)]
pub struct Projection {
    pub table: Table,
    pub created_columns: usize,
    pub formatted_date_columns: usize,
    /// Copy specs whose source column was not found
    pub missing_columns: usize,
}

/// Builds the output table column by column in spec order
pub struct ColumnProjector<'a> {
    specs: &'a [ColumnSpec],
}

impl<'a> ColumnProjector<'a> {
    pub fn new(specs: &'a [ColumnSpec]) -> Self {
        Self { specs }
    }

    pub fn project(&self, input: &Table, diagnostics: &mut Diagnostics) -> Projection {
        let rows = input.row_count();
        let mut projection = Projection {
            table: Table::new(rows),
            created_columns: 0,
            formatted_date_columns: 0,
            missing_columns: 0,
        };

        info!(
            "Projecting {} input columns onto {} target columns",
            input.column_count(),
            self.specs.len()
        );

        for spec in self.specs {
            let values = match spec.action {
                ColumnAction::Create => {
                    projection.created_columns += 1;
                    create_values(spec, rows)
                }
                ColumnAction::Copy => match input.find_column(&spec.source_name) {
                    Some(idx) => {
                        let source = &input.columns()[idx];
                        if spec.is_date {
                            projection.formatted_date_columns += 1;
                            format_dates(spec, &source.values, diagnostics)
                        } else {
                            debug!("Copied '{}' as '{}'", source.name, spec.target_name);
                            source.values.clone()
                        }
                    }
                    None => {
                        projection.missing_columns += 1;
                        diagnostics.warn(
                            DiagnosticKind::ColumnResolutionMiss,
                            format!(
                                "Source column '{}' not found in input; '{}' left empty",
                                spec.source_name, spec.target_name
                            ),
                        );
                        vec![CellValue::text(""); rows]
                    }
                },
            };

            if projection.table.set_column(spec.target_name.clone(), values) {
                diagnostics.warn(
                    DiagnosticKind::SoftValidation,
                    format!(
                        "Target column '{}' declared more than once; last declaration wins",
                        spec.target_name
                    ),
                );
            }
        }

        projection
    }
}

fn create_values(spec: &ColumnSpec, rows: usize) -> Vec<CellValue> {
    // The project column is always blank; replace rules fill it later
    let value = if spec.target_name == PROJECT_COLUMN {
        String::new()
    } else {
        spec.fixed_value.clone().unwrap_or_default()
    };
    debug!("Created '{}' with value '{}'", spec.target_name, value);
    vec![CellValue::Text(value); rows]
}

fn format_dates(
    spec: &ColumnSpec,
    values: &[CellValue],
    diagnostics: &mut Diagnostics,
) -> Vec<CellValue> {
    let formatter = DateFormatter::from_spec(&spec.date_format, &spec.date_locale);
    let mut degraded = Vec::new();

    let formatted = values
        .iter()
        .map(|value| {
            let outcome = formatter.format_cell(value);
            if outcome.is_degraded() {
                degraded.push(value.to_string());
            }
            CellValue::Text(outcome.into_text())
        })
        .collect();

    if !degraded.is_empty() {
        let sample: Vec<&str> = degraded.iter().take(3).map(String::as_str).collect();
        diagnostics.warn(
            DiagnosticKind::DateParseDegradation,
            format!(
                "{} cell(s) in '{}' are not dates and were kept as text (e.g. {:?})",
                degraded.len(),
                spec.target_name,
                sample
            ),
        );
    }

    info!(
        "Formatted date column '{}' as {} ({})",
        spec.target_name, spec.date_format, spec.date_locale
    );
    formatted
}
