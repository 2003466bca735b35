//! Run configuration: command-line flags with environment fallbacks

use crate::error::{SheetforgeError, SheetforgeResult};
use crate::excel::{WorkbookWriter, DEFAULT_FILE_PREFIX, DEFAULT_SHEET_NAME};
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Characters Excel does not allow in worksheet names
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const MAX_SHEET_NAME_LEN: usize = 31;

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Instruction workbook (.xlsx) describing the transformation
    #[arg(short, long, global = true, env = "SHEETFORGE_INSTRUCTIONS")]
    pub instructions: Option<PathBuf>,

    /// Directory for output workbooks [default: system temp dir]
    #[arg(short, long, global = true, env = "SHEETFORGE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Worksheet name in the output workbook
    #[arg(long, global = true, default_value = DEFAULT_SHEET_NAME, env = "SHEETFORGE_SHEET_NAME")]
    pub sheet_name: String,

    /// Output filename prefix; a timestamp and .xlsx are appended
    #[arg(long, global = true, default_value = DEFAULT_FILE_PREFIX, env = "SHEETFORGE_FILE_PREFIX")]
    pub file_prefix: String,

    /// Reject input files larger than this many megabytes
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_FILE_SIZE_MB, env = "SHEETFORGE_MAX_FILE_SIZE_MB")]
    pub max_file_size_mb: u64,

    /// Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL, env = "SHEETFORGE_LOG_LEVEL")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instructions: None,
            output_dir: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Check values clap cannot check on its own
    pub fn validate(&self) -> SheetforgeResult<()> {
        let name = self.sheet_name.trim();
        if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(SheetforgeError::Config(format!(
                "Sheet name '{}' must be 1-{} characters",
                self.sheet_name, MAX_SHEET_NAME_LEN
            )));
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
            return Err(SheetforgeError::Config(format!(
                "Sheet name '{}' contains forbidden character '{}'",
                self.sheet_name, c
            )));
        }
        if self.file_prefix.trim().is_empty() {
            return Err(SheetforgeError::Config("File prefix must not be empty".to_string()));
        }
        if self.max_file_size_mb == 0 {
            return Err(SheetforgeError::Config(
                "Maximum file size must be at least 1 MB".to_string(),
            ));
        }
        Ok(())
    }

    /// The instruction workbook path, required for processing
    pub fn instructions_path(&self) -> SheetforgeResult<&PathBuf> {
        self.instructions.as_ref().ok_or_else(|| {
            SheetforgeError::Config(
                "No instruction workbook: pass --instructions or set SHEETFORGE_INSTRUCTIONS"
                    .to_string(),
            )
        })
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Reject inputs over the size limit before any parsing
    pub fn check_file_size(&self, name: &str, size: u64) -> SheetforgeResult<()> {
        if size > self.max_file_size_bytes() {
            return Err(SheetforgeError::Config(format!(
                "File '{}' is {:.2} MB, limit is {} MB",
                name,
                size as f64 / (1024.0 * 1024.0),
                self.max_file_size_mb
            )));
        }
        Ok(())
    }

    pub fn writer(&self) -> WorkbookWriter {
        WorkbookWriter::new(self.sheet_name.trim(), self.file_prefix.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sheet_name, "Дислокация");
        assert_eq!(config.max_file_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.output_dir(), std::env::temp_dir());
    }

    #[test]
    fn test_bad_sheet_names() {
        for name in ["", "a/b", "x".repeat(32).as_str()] {
            let config = Config {
                sheet_name: name.to_string(),
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(SheetforgeError::Config(_))), "{}", name);
        }
    }

    #[test]
    fn test_file_size_limit() {
        let config = Config {
            max_file_size_mb: 1,
            ..Default::default()
        };
        assert!(config.check_file_size("small.xlsx", 1024 * 1024).is_ok());
        let err = config.check_file_size("big.xlsx", 1024 * 1024 + 1).unwrap_err();
        assert!(err.to_string().contains("big.xlsx"));
    }

    #[test]
    fn test_missing_instructions_path() {
        assert!(matches!(
            Config::default().instructions_path(),
            Err(SheetforgeError::Config(_))
        ));
    }
}
