use clap::{Parser, Subcommand};
use sheetforge::cli::{self, InspectFormat};
use sheetforge::config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetforge")]
#[command(about = "Instruction-driven spreadsheet transformation")]
#[command(long_about = "Sheetforge - instruction-driven spreadsheet transformation

Reads a data workbook with an arbitrary layout and rebuilds it according to
an instruction workbook: which columns to keep, rename or create, how to
reformat dates, which values to replace, and how to style the result.

INSTRUCTION WORKBOOK SHEETS:
  columns     - source, target, action (copy|create), value, is_date,
                date_format, date_locale
  replace     - column, find, replace, project, project2
  email       - parameter/value pairs for the result notification
  formatting  - font_name, font_size, header_background_color,
                header_text_color, cell_background_color

COMMANDS:
  process   - Transform a data workbook and write the styled result
  inspect   - Parse and validate an instruction workbook

EXAMPLES:
  sheetforge process dislocation.xlsx -i instructions.xlsx -o out/
  sheetforge process dislocation.xlsx -i instructions.xlsx --json
  sheetforge inspect instructions.xlsx --format yaml")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Transform a data workbook.

The first sheet of INPUT is read as a table (first row = headers), projected
onto the columns declared in the instruction workbook, rewritten by the
replace rules and saved as <prefix>_<YYYY-MM-DD-HH-MM>.xlsx in the output
directory.

Missing source columns, unknown rule columns and unparseable dates are
reported as warnings; the output is still written.

EXAMPLES:
  sheetforge process dislocation.xlsx -i instructions.xlsx
  sheetforge process dislocation.xlsx -i instructions.xlsx --preview-email --sender ops@example.com")]
    /// Transform a data workbook using an instruction workbook
    Process {
        /// Data workbook (.xlsx, .xls, .xlsb, .ods)
        input: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Render the result notification from the email sheet
        #[arg(long)]
        preview_email: bool,

        /// Sender address shown in the notification
        #[arg(long, requires = "preview_email")]
        sender: Option<String>,
    },

    /// Parse and validate an instruction workbook
    Inspect {
        /// Instruction workbook (.xlsx)
        file: PathBuf,

        /// Print the parsed instructions instead of a summary
        #[arg(short, long, value_enum)]
        format: Option<InspectFormat>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(&cli.config.log_level);

    match cli.command {
        Commands::Process {
            input,
            json,
            preview_email,
            sender,
        } => cli::process(input, &cli.config, json, preview_email, sender)?,
        Commands::Inspect { file, format } => cli::inspect(file, &cli.config, format)?,
    }
    Ok(())
}
