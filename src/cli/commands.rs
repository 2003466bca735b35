use crate::config::Config;
use crate::core::Processor;
use crate::error::{Diagnostics, SheetforgeResult};
use crate::parser::{self, ParsedInstructions};
use crate::report::{self, RenderedMessage, ReportContext};
use crate::types::{ColumnAction, InstructionSet, Statistics};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output format of the inspect command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectFormat {
    Yaml,
    Json,
}

/// Machine-readable result of the process command
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessReport<'a> {
    source: &'a str,
    output: String,
    statistics: Statistics,
    diagnostics: &'a Diagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<RenderedMessage>,
}

/// Execute the process command
pub fn process(
    input: PathBuf,
    config: &Config,
    json: bool,
    preview_email: bool,
    sender: Option<String>,
) -> SheetforgeResult<()> {
    config.validate()?;
    let instructions_path = config.instructions_path()?;
    let source_filename = file_name(&input);

    if !json {
        println!("{}", "🔥 Sheetforge - Processing".bold().green());
        println!("   Input:        {}", input.display());
        println!("   Instructions: {}\n", instructions_path.display());
    }

    let instruction_bytes = read_checked(instructions_path, config)?;
    let bytes = read_checked(&input, config)?;

    let ParsedInstructions {
        instructions,
        mut diagnostics,
    } = parser::parse_instructions(&instruction_bytes)?;

    let outcome = Processor::new(&instructions).process_bytes(&bytes, &source_filename)?;
    diagnostics.extend(outcome.diagnostics.clone());

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir)?;
    let processed_at = chrono::Local::now().naive_local();
    let output_path = config
        .writer()
        .save(&outcome.table, &outcome.presentation, &output_dir, processed_at)?;
    let output_filename = file_name(&output_path);

    let notification = if preview_email {
        let context = ReportContext {
            source_filename: &source_filename,
            output_filename: &output_filename,
            sender_email: sender.as_deref().unwrap_or_default(),
            processed_at,
            statistics: outcome.statistics,
        };
        Some(report::render_message(
            &instructions.email,
            &instructions.email_variables,
            &context,
            &mut diagnostics,
        )?)
    } else {
        None
    };

    if json {
        let report = ProcessReport {
            source: &source_filename,
            output: output_path.display().to_string(),
            statistics: outcome.statistics,
            diagnostics: &diagnostics,
            notification,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_statistics(&outcome.statistics);
    print_diagnostics(&diagnostics);

    if let Some(message) = notification {
        println!("{}", "📧 Notification preview".bold().cyan());
        println!("   Subject: {}", message.subject.bold());
        println!();
        for line in message.body.lines() {
            println!("   {}", line);
        }
        println!();
    }

    println!("{}", "✅ Processing complete!".bold().green());
    println!("   Output: {}\n", output_path.display());
    Ok(())
}

/// Execute the inspect command
pub fn inspect(
    file: PathBuf,
    config: &Config,
    format: Option<InspectFormat>,
) -> SheetforgeResult<()> {
    let parsed = parser::parse_instructions(&read_checked(&file, config)?)?;

    match format {
        Some(InspectFormat::Yaml) => {
            print!("{}", serde_yaml::to_string(&parsed.instructions)?);
        }
        Some(InspectFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(&parsed.instructions)?);
        }
        None => {
            println!("{}", "🔍 Sheetforge - Instruction workbook".bold().green());
            println!("   File: {}\n", file.display());
            print_instruction_summary(&parsed.instructions);
            print_diagnostics(&parsed.diagnostics);
            if parsed.diagnostics.is_empty() {
                println!("{}", "✅ Instructions are valid".bold().green());
            } else {
                println!(
                    "{}",
                    format!("⚠️  Instructions usable with {} warning(s)", parsed.diagnostics.len())
                        .bold()
                        .yellow()
                );
            }
        }
    }
    Ok(())
}

fn print_instruction_summary(instructions: &InstructionSet) {
    println!(
        "{}",
        format!("📋 Columns ({})", instructions.columns.len()).bold().cyan()
    );
    for (idx, spec) in instructions.columns.iter().enumerate() {
        let detail = match spec.action {
            ColumnAction::Create => match &spec.fixed_value {
                Some(value) => format!("create = \"{}\"", value),
                None => "create".to_string(),
            },
            ColumnAction::Copy => format!("copy from '{}'", spec.source_name),
        };
        let date = if spec.is_date {
            format!(" [date {} {}]", spec.date_format, spec.date_locale)
                .magenta()
                .to_string()
        } else {
            String::new()
        };
        println!("   {:>2}. {} ← {}{}", idx + 1, spec.target_name.bold(), detail, date);
    }
    println!();

    println!(
        "{}",
        format!("🔁 Replace rules ({})", instructions.replace_rules.len())
            .bold()
            .cyan()
    );
    for rule in &instructions.replace_rules {
        let mut line = format!(
            "   {}: '{}' → '{}'",
            rule.column, rule.find_value, rule.replace_value
        );
        if let Some(project) = &rule.project_value {
            line.push_str(&format!(", проект = {}", project));
        }
        if let Some(request) = &rule.project_value2 {
            line.push_str(&format!(", Заявка = {}", request));
        }
        println!("{}", line);
    }
    println!();

    println!(
        "{}",
        format!("🎨 Formatting ({})", instructions.formatting.len())
            .bold()
            .cyan()
    );
    for (name, value) in instructions.formatting.iter() {
        println!("   {} = {}", name, value);
    }
    println!();

    if !instructions.email.is_empty() {
        let keys: Vec<&str> = instructions.email.keys().map(String::as_str).collect();
        println!("{}", "📧 Email".bold().cyan());
        println!("   Parameters: {}", keys.join(", "));
        if !instructions.email_variables.is_empty() {
            println!("   Variables:  {}", instructions.email_variables.join(", "));
        }
        println!();
    }
}

fn print_statistics(stats: &Statistics) {
    println!("{}", "📊 Statistics".bold().cyan());
    println!("   Processed rows:         {}", stats.processed_rows);
    println!("   Applied rules:          {}", stats.applied_rules);
    println!("   Created columns:        {}", stats.created_columns);
    println!("   Formatted date columns: {}", stats.formatted_date_columns);
    if stats.unmatched_rules > 0 {
        println!("   Rules without matches:  {}", stats.unmatched_rules);
    }
    if stats.unresolved_rules > 0 {
        println!(
            "   {}",
            format!("Rules with unknown column: {}", stats.unresolved_rules).yellow()
        );
    }
    if stats.missing_columns > 0 {
        println!(
            "   {}",
            format!("Missing source columns: {}", stats.missing_columns).yellow()
        );
    }
    println!();
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    println!(
        "{}",
        format!("⚠️  Warnings ({})", diagnostics.len()).bold().yellow()
    );
    for diagnostic in diagnostics.iter() {
        println!("   {}", diagnostic.to_string().yellow());
    }
    println!();
}

/// Enforce the size limit from metadata before reading the whole file
fn read_checked(path: &Path, config: &Config) -> SheetforgeResult<Vec<u8>> {
    config.check_file_size(&file_name(path), fs::metadata(path)?.len())?;
    Ok(fs::read(path)?)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
