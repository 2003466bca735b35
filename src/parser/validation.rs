//! Post-parse checks on an instruction set. Nothing here fails; problems
//! become soft diagnostics and the instruction set stays usable.

use crate::core::dates::{DateLocale, DatePattern, RECOGNIZED_DATE_FORMATS, RECOGNIZED_LOCALES};
use crate::error::{DiagnosticKind, Diagnostics};
use crate::report::{BODY_TEMPLATE_KEY, PLACEHOLDERS, SUBJECT_KEY};
use crate::types::{ColumnAction, InstructionSet};
use std::collections::BTreeSet;
use tracing::info;

/// Run every check and record warnings into `diagnostics`
pub fn validate(instructions: &InstructionSet, diagnostics: &mut Diagnostics) {
    check_columns(instructions, diagnostics);
    summarize_rules(instructions);
    check_email(instructions, diagnostics);
}

fn check_columns(instructions: &InstructionSet, diagnostics: &mut Diagnostics) {
    if instructions.columns.is_empty() {
        return;
    }

    let created = instructions
        .columns
        .iter()
        .filter(|c| c.action == ColumnAction::Create)
        .count();
    info!("Columns to create: {}", created);

    let date_columns: Vec<_> = instructions.columns.iter().filter(|c| c.is_date).collect();
    if date_columns.is_empty() {
        return;
    }
    info!("Date columns: {}", date_columns.len());

    for column in date_columns {
        if DatePattern::parse(&column.date_format).is_none() {
            diagnostics.warn(
                DiagnosticKind::SoftValidation,
                format!(
                    "Unknown date format '{}' for column '{}'; supported: {}",
                    column.date_format,
                    column.target_name,
                    RECOGNIZED_DATE_FORMATS.join(", ")
                ),
            );
        }
        if DateLocale::parse(&column.date_locale).is_none() {
            diagnostics.warn(
                DiagnosticKind::SoftValidation,
                format!(
                    "Unknown locale '{}' for column '{}'; supported: {}",
                    column.date_locale,
                    column.target_name,
                    RECOGNIZED_LOCALES.join(", ")
                ),
            );
        }
    }
}

fn summarize_rules(instructions: &InstructionSet) {
    if instructions.replace_rules.is_empty() {
        return;
    }
    let projects: BTreeSet<&str> = instructions
        .replace_rules
        .iter()
        .filter_map(|r| r.project_value.as_deref())
        .collect();
    let requests: BTreeSet<&str> = instructions
        .replace_rules
        .iter()
        .filter_map(|r| r.project_value2.as_deref())
        .collect();
    info!("Distinct projects in rules: {} {:?}", projects.len(), projects);
    info!("Distinct requests in rules: {} {:?}", requests.len(), requests);
}

fn check_email(instructions: &InstructionSet, diagnostics: &mut Diagnostics) {
    let email = &instructions.email;
    if email.is_empty() && instructions.email_variables.is_empty() {
        return;
    }

    if !email.contains_key(SUBJECT_KEY) {
        diagnostics.warn(
            DiagnosticKind::SoftValidation,
            format!("Email section has no '{}' parameter", SUBJECT_KEY),
        );
    }

    match email.get(BODY_TEMPLATE_KEY) {
        Some(template) => {
            let used: Vec<&str> = PLACEHOLDERS
                .iter()
                .copied()
                .filter(|name| template.contains(&format!("{{{}}}", name)))
                .collect();
            info!("Placeholders in body template: {:?}", used);
        }
        None => info!("No body template; legacy notification layout will be used"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnSpec, ReplaceRule};

    #[test]
    fn test_unknown_date_format_and_locale() {
        let instructions = InstructionSet {
            columns: vec![
                ColumnSpec::copy("Дата", "Дата").with_date("YYYY/DD/MM", "de"),
                ColumnSpec::copy("Прибытие", "Прибытие").with_date("DD MMMM YYYY", "EN"),
            ],
            ..Default::default()
        };
        let mut diagnostics = Diagnostics::new();
        validate(&instructions, &mut diagnostics);

        assert_eq!(diagnostics.count(DiagnosticKind::SoftValidation), 3);
        assert!(diagnostics.mentions(DiagnosticKind::SoftValidation, "YYYY/DD/MM"));
        assert!(diagnostics.mentions(DiagnosticKind::SoftValidation, "'EN'"));
        assert!(diagnostics.mentions(DiagnosticKind::SoftValidation, "'de'"));
    }

    #[test]
    fn test_locale_is_case_sensitive() {
        let instructions = InstructionSet {
            columns: vec![ColumnSpec::copy("Дата", "Дата").with_date("DD MMM YYYY", "EN")],
            ..Default::default()
        };
        let mut diagnostics = Diagnostics::new();
        validate(&instructions, &mut diagnostics);

        assert_eq!(diagnostics.count(DiagnosticKind::SoftValidation), 1);
        assert!(diagnostics.mentions(DiagnosticKind::SoftValidation, "'EN'"));
    }

    #[test]
    fn test_format_checked_only_for_date_columns() {
        let mut spec = ColumnSpec::copy("Груз", "Груз");
        spec.date_format = "whatever".to_string();
        let instructions = InstructionSet {
            columns: vec![spec],
            ..Default::default()
        };
        let mut diagnostics = Diagnostics::new();
        validate(&instructions, &mut diagnostics);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_subject_only_when_email_present() {
        let mut diagnostics = Diagnostics::new();
        validate(&InstructionSet::default(), &mut diagnostics);
        assert!(diagnostics.is_empty());

        let mut instructions = InstructionSet {
            replace_rules: vec![ReplaceRule::new("Статус", "FAIL", "Ошибка").with_project("P1")],
            ..Default::default()
        };
        instructions
            .email
            .insert(BODY_TEMPLATE_KEY.to_string(), "Файл {output_filename}".to_string());
        validate(&instructions, &mut diagnostics);
        assert!(diagnostics.mentions(DiagnosticKind::SoftValidation, "subject"));

        instructions
            .email
            .insert(SUBJECT_KEY.to_string(), "Готово".to_string());
        let mut diagnostics = Diagnostics::new();
        validate(&instructions, &mut diagnostics);
        assert!(diagnostics.is_empty());
    }
}
