//! CLI command tests

mod common;

use sheetforge::cli::commands::{self, InspectFormat};
use sheetforge::config::Config;
use sheetforge::SheetforgeError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    instructions: PathBuf,
    input: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let instructions = dir.path().join("instructions.xlsx");
        let input = dir.path().join("dislocation.xlsx");
        fs::write(&instructions, common::instruction_workbook()).unwrap();
        fs::write(&input, common::data_workbook()).unwrap();
        Self {
            dir,
            instructions,
            input,
        }
    }

    fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn config(&self) -> Config {
        Config {
            instructions: Some(self.instructions.clone()),
            output_dir: Some(self.out_dir()),
            ..Default::default()
        }
    }
}

fn xlsx_files(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".xlsx"))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// PROCESS COMMAND TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_process_writes_output() {
    let fixture = Fixture::new();
    let result = commands::process(fixture.input.clone(), &fixture.config(), false, false, None);
    assert!(result.is_ok(), "{:?}", result);

    let files = xlsx_files(&fixture.out_dir());
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("TRANSFORA_dislocation_"));
}

#[test]
fn test_process_json_with_preview() {
    let fixture = Fixture::new();
    let config = Config {
        file_prefix: "report".to_string(),
        sheet_name: "Итог".to_string(),
        ..fixture.config()
    };
    let result = commands::process(
        fixture.input.clone(),
        &config,
        true,
        true,
        Some("ops@example.com".to_string()),
    );
    assert!(result.is_ok(), "{:?}", result);
    assert!(xlsx_files(&fixture.out_dir())[0].starts_with("report_"));
}

#[test]
fn test_process_without_instructions() {
    let fixture = Fixture::new();
    let config = Config {
        instructions: None,
        ..fixture.config()
    };
    let result = commands::process(fixture.input.clone(), &config, false, false, None);
    assert!(matches!(result, Err(SheetforgeError::Config(_))));
}

#[test]
fn test_process_rejects_large_input() {
    let fixture = Fixture::new();
    fs::write(&fixture.input, vec![0u8; 1024 * 1024 + 1]).unwrap();
    let config = Config {
        max_file_size_mb: 1,
        ..fixture.config()
    };
    let result = commands::process(fixture.input.clone(), &config, false, false, None);
    assert!(matches!(result, Err(SheetforgeError::Config(_))));
    assert!(!fixture.out_dir().exists());
}

#[test]
fn test_process_corrupt_instructions() {
    let fixture = Fixture::new();
    fs::write(&fixture.instructions, b"garbage").unwrap();
    let result = commands::process(fixture.input.clone(), &fixture.config(), false, false, None);
    assert!(matches!(result, Err(SheetforgeError::Parse(_))));
}

#[test]
fn test_process_corrupt_input() {
    let fixture = Fixture::new();
    fs::write(&fixture.input, b"garbage").unwrap();
    let result = commands::process(fixture.input.clone(), &fixture.config(), false, false, None);
    assert!(matches!(result, Err(SheetforgeError::Import(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// INSPECT COMMAND TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_inspect_all_formats() {
    let fixture = Fixture::new();
    for format in [None, Some(InspectFormat::Yaml), Some(InspectFormat::Json)] {
        let result = commands::inspect(fixture.instructions.clone(), &fixture.config(), format);
        assert!(result.is_ok(), "{:?}: {:?}", format, result);
    }
}

#[test]
fn test_inspect_nonexistent_file() {
    let result = commands::inspect(PathBuf::from("nonexistent.xlsx"), &Config::default(), None);
    assert!(matches!(result, Err(SheetforgeError::Io(_))));
}

#[test]
fn test_inspect_respects_size_limit() {
    let fixture = Fixture::new();
    fs::write(&fixture.instructions, vec![0u8; 1024 * 1024 + 1]).unwrap();
    let config = Config {
        max_file_size_mb: 1,
        ..fixture.config()
    };
    let result = commands::inspect(fixture.instructions.clone(), &config, None);
    assert!(matches!(result, Err(SheetforgeError::Config(_))));
}
