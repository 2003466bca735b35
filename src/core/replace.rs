//! Sequential find/replace rules over the projected table

use crate::error::{DiagnosticKind, Diagnostics};
use crate::types::{CellValue, ReplaceRule, Table, PROJECT_COLUMN, REQUEST_COLUMN};
use tracing::{debug, info};

/// What one rule did to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule's column is not in the table; the rule was skipped
    Unresolved,
    /// The column exists but no cell matched
    NoMatch,
    /// At least one row matched and was rewritten
    Applied { rows: usize },
}

/// Per-rule outcomes in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub outcomes: Vec<RuleOutcome>,
}

impl ReplaceSummary {
    /// Rules that matched at least one row
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, RuleOutcome::Applied { .. }))
    }

    pub fn unmatched(&self) -> usize {
        self.count(|o| *o == RuleOutcome::NoMatch)
    }

    pub fn unresolved(&self) -> usize {
        self.count(|o| *o == RuleOutcome::Unresolved)
    }

    /// Total rows rewritten across all rules
    pub fn rewritten_rows(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                RuleOutcome::Applied { rows } => *rows,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&RuleOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Applies rules strictly in order, each as a full pass over the table
pub struct ReplaceEngine<'a> {
    rules: &'a [ReplaceRule],
}

impl<'a> ReplaceEngine<'a> {
    pub fn new(rules: &'a [ReplaceRule]) -> Self {
        Self { rules }
    }

    pub fn apply(&self, table: &mut Table, diagnostics: &mut Diagnostics) -> ReplaceSummary {
        let summary = self
            .rules
            .iter()
            .fold(ReplaceSummary::default(), |mut summary, rule| {
                summary.outcomes.push(apply_rule(table, rule, diagnostics));
                summary
            });

        info!(
            "Replace rules: {} applied, {} without matches, {} skipped",
            summary.applied(),
            summary.unmatched(),
            summary.unresolved()
        );
        summary
    }
}

/// Apply a single rule: match by canonical string form, then write
pub fn apply_rule(table: &mut Table, rule: &ReplaceRule, diagnostics: &mut Diagnostics) -> RuleOutcome {
    let Some(target) = table.find_column(&rule.column) else {
        diagnostics.warn(
            DiagnosticKind::ColumnResolutionMiss,
            format!("Replace rule column '{}' not found; rule skipped", rule.column),
        );
        return RuleOutcome::Unresolved;
    };

    let matched: Vec<usize> = table.columns()[target]
        .values
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.to_string() == rule.find_value)
        .map(|(row, _)| row)
        .collect();

    if matched.is_empty() {
        info!(
            "Replace rule not applied: '{}' not found in column '{}'",
            rule.find_value, table.columns()[target].name
        );
        return RuleOutcome::NoMatch;
    }

    write_rows(table, target, &matched, &rule.replace_value);

    if let Some(project) = &rule.project_value {
        write_side_effect(table, PROJECT_COLUMN, &matched, project);
    }
    if let Some(request) = &rule.project_value2 {
        write_side_effect(table, REQUEST_COLUMN, &matched, request);
    }

    info!(
        "Replace rule applied: '{}' -> '{}' in column '{}' ({} rows)",
        rule.find_value,
        rule.replace_value,
        table.columns()[target].name,
        matched.len()
    );
    RuleOutcome::Applied {
        rows: matched.len(),
    }
}

fn write_side_effect(table: &mut Table, column: &str, rows: &[usize], value: &str) {
    match table.position(column) {
        Some(idx) => {
            write_rows(table, idx, rows, value);
            debug!("Set '{}' = '{}' for {} rows", column, value, rows.len());
        }
        None => debug!("Side-effect column '{}' absent; '{}' not written", column, value),
    }
}

fn write_rows(table: &mut Table, column: usize, rows: &[usize], value: &str) {
    if let Some(col) = table.column_mut(column) {
        for &row in rows {
            if let Some(cell) = col.values.get_mut(row) {
                *cell = CellValue::text(value);
            }
        }
    }
}
