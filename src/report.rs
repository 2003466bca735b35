//! Result notification rendering
//!
//! Builds the subject and body of the message that accompanies an output
//! workbook, from the `email` section of the instruction workbook. Delivery
//! is not handled here.

use crate::error::{DiagnosticKind, Diagnostics, SheetforgeError, SheetforgeResult};
use crate::types::Statistics;
use chrono::NaiveDateTime;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

pub const SUBJECT_KEY: &str = "subject";
pub const BODY_TEMPLATE_KEY: &str = "body_template";
pub const BODY_HEADER_KEY: &str = "body_header";
pub const BODY_FOOTER_KEY: &str = "body_footer";
pub const FOOTER_TEXT_KEY: &str = "footer_text";

/// Placeholders available to subject and body templates
pub const PLACEHOLDERS: [&str; 12] = [
    "source_filename",
    "output_filename",
    "sender_email",
    "processing_date",
    "processing_date_short",
    "processing_time",
    "processed_rows",
    "applied_rules",
    "created_columns",
    "formatted_date_columns",
    "custom_content",
    "footer_text",
];

const DEFAULT_SUBJECT: &str = "Обработанный файл: {output_filename}";
const DEFAULT_HEADER: &str = "Результат автоматической обработки файла дислокации вагонов.";
const DEFAULT_FOOTER: &str = "Автоматическая обработка sheetforge";
const DEFAULT_BODY: &str = "Результат автоматической обработки файла дислокации вагонов.\n\n\n\
Приложение к письму: {output_filename}\n\n---\n{footer_text}";

/// Which layout produced the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateMode {
    /// `body_template` from the email section
    Custom,
    /// Email section without `body_template`: header, fixed statistics block, footer
    Legacy,
    /// No email section at all
    Default,
}

/// Facts about one processed file
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub source_filename: &'a str,
    pub output_filename: &'a str,
    pub sender_email: &'a str,
    pub processed_at: NaiveDateTime,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
    pub mode: TemplateMode,
}

/// Render the notification for one output file.
///
/// Unknown placeholders are kept verbatim and recorded in `diagnostics`.
pub fn render_message(
    email: &BTreeMap<String, String>,
    variables: &[String],
    context: &ReportContext<'_>,
    diagnostics: &mut Diagnostics,
) -> SheetforgeResult<RenderedMessage> {
    let values = placeholder_values(email, context);
    let subject_template = email
        .get(SUBJECT_KEY)
        .map(String::as_str)
        .unwrap_or(DEFAULT_SUBJECT);

    let message = if let Some(template) = email.get(BODY_TEMPLATE_KEY) {
        info!("Rendering notification from body template");
        RenderedMessage {
            subject: fill_placeholders(subject_template, &values, diagnostics)?,
            body: fill_placeholders(template, &values, diagnostics)?,
            mode: TemplateMode::Custom,
        }
    } else if !email.is_empty() || !variables.is_empty() {
        info!("Rendering notification with legacy layout");
        RenderedMessage {
            subject: fill_placeholders(subject_template, &values, diagnostics)?,
            body: legacy_body(email, context, &values),
            mode: TemplateMode::Legacy,
        }
    } else {
        info!("Rendering default notification");
        RenderedMessage {
            subject: format!("Обработанный файл: {}", context.output_filename),
            body: fill_placeholders(DEFAULT_BODY, &values, diagnostics)?,
            mode: TemplateMode::Default,
        }
    };

    Ok(message)
}

/// Values for every entry of [`PLACEHOLDERS`]
pub fn placeholder_values(
    email: &BTreeMap<String, String>,
    context: &ReportContext<'_>,
) -> BTreeMap<&'static str, String> {
    let stats = &context.statistics;
    let footer = email
        .get(FOOTER_TEXT_KEY)
        .cloned()
        .unwrap_or_else(|| DEFAULT_FOOTER.to_string());

    BTreeMap::from([
        ("source_filename", context.source_filename.to_string()),
        ("output_filename", context.output_filename.to_string()),
        ("sender_email", context.sender_email.to_string()),
        (
            "processing_date",
            context.processed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
        (
            "processing_date_short",
            context.processed_at.format("%Y-%m-%d").to_string(),
        ),
        ("processing_time", context.processed_at.format("%H:%M").to_string()),
        ("processed_rows", stats.processed_rows.to_string()),
        ("applied_rules", stats.applied_rules.to_string()),
        ("created_columns", stats.created_columns.to_string()),
        (
            "formatted_date_columns",
            stats.formatted_date_columns.to_string(),
        ),
        ("custom_content", custom_content(stats)),
        ("footer_text", footer),
    ])
}

/// Summary lines for rules and created columns; empty when both are zero
pub fn custom_content(stats: &Statistics) -> String {
    let mut lines = Vec::new();
    if stats.applied_rules > 0 {
        lines.push(format!(
            "✅ Успешно применены правила замены для {} типов записей",
            stats.applied_rules
        ));
    }
    if stats.created_columns > 0 {
        lines.push(format!("📊 Добавлено новых колонок: {}", stats.created_columns));
    }
    lines.join("\n")
}

/// Substitute `{name}` placeholders; `{{` and `}}` produce literal braces
pub fn fill_placeholders(
    template: &str,
    values: &BTreeMap<&'static str, String>,
    diagnostics: &mut Diagnostics,
) -> SheetforgeResult<String> {
    let pattern = Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| SheetforgeError::Export(format!("Regex error: {}", e)))?;

    let mut unknown = Vec::new();
    let rendered = pattern.replace_all(template, |caps: &Captures| match caps.get(1) {
        None if &caps[0] == "{{" => "{".to_string(),
        None => "}".to_string(),
        Some(name) => match values.get(name.as_str()) {
            Some(value) => value.clone(),
            None => {
                unknown.push(name.as_str().to_string());
                caps[0].to_string()
            }
        },
    });
    let rendered = rendered.into_owned();

    for name in unknown {
        diagnostics.warn(
            DiagnosticKind::SoftValidation,
            format!("Unknown placeholder '{{{}}}' left as is", name),
        );
    }
    Ok(rendered)
}

fn legacy_body(
    email: &BTreeMap<String, String>,
    context: &ReportContext<'_>,
    values: &BTreeMap<&'static str, String>,
) -> String {
    let header = email
        .get(BODY_HEADER_KEY)
        .map(String::as_str)
        .unwrap_or(DEFAULT_HEADER);
    let footer = email
        .get(BODY_FOOTER_KEY)
        .map(String::as_str)
        .unwrap_or(DEFAULT_FOOTER);
    let stats = &context.statistics;
    let processing_date = values
        .get("processing_date")
        .map(String::as_str)
        .unwrap_or_default();

    format!(
        "{header}\n\n\
         Исходный файл: {source}\n\
         Обработанный файл: {output}\n\
         Отправитель: {sender}\n\
         Дата и время обработки: {processing_date}\n\n\
         Статистика обработки:\n\
         - Обработано строк: {rows}\n\
         - Применено правил замены: {rules}\n\
         - Создано колонок: {created}\n\n\n\
         ---\n\
         {footer}",
        source = context.source_filename,
        output = context.output_filename,
        sender = context.sender_email,
        rows = stats.processed_rows,
        rules = stats.applied_rules,
        created = stats.created_columns,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn context() -> ReportContext<'static> {
        ReportContext {
            source_filename: "dislocation.xlsx",
            output_filename: "TRANSFORA_dislocation_2025-03-07-09-05.xlsx",
            sender_email: "ops@example.com",
            processed_at: NaiveDate::from_ymd_opt(2025, 3, 7)
                .unwrap()
                .and_hms_opt(9, 5, 30)
                .unwrap(),
            statistics: Statistics {
                processed_rows: 3,
                applied_rules: 1,
                created_columns: 2,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_fill_placeholders_with_escapes() {
        let values = placeholder_values(&BTreeMap::new(), &context());
        let mut diagnostics = Diagnostics::new();
        let out = fill_placeholders(
            "{{raw}} {processed_rows} rows at {processing_time} on {processing_date_short}",
            &values,
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(out, "{raw} 3 rows at 09:05 on 2025-03-07");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let values = placeholder_values(&BTreeMap::new(), &context());
        let mut diagnostics = Diagnostics::new();
        let out = fill_placeholders("Hi {recipient}, {output_filename}", &values, &mut diagnostics)
            .unwrap();
        assert_eq!(out, "Hi {recipient}, TRANSFORA_dislocation_2025-03-07-09-05.xlsx");
        assert!(diagnostics.mentions(DiagnosticKind::SoftValidation, "{recipient}"));
    }

    #[test]
    fn test_custom_content() {
        assert_eq!(
            custom_content(&Statistics::default()),
            ""
        );
        let content = custom_content(&context().statistics);
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("Добавлено новых колонок: 2"));
    }

    #[test]
    fn test_footer_from_section() {
        let email = BTreeMap::from([(FOOTER_TEXT_KEY.to_string(), "Отдел логистики".to_string())]);
        let values = placeholder_values(&email, &context());
        assert_eq!(values["footer_text"], "Отдел логистики");
        assert_eq!(values.len(), PLACEHOLDERS.len());
    }
}
