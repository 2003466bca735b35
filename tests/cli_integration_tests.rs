//! Binary integration tests
//!
//! Runs the `sheetforge` binary as a subprocess to cover main.rs and
//! argument/environment handling.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn sheetforge() -> Command {
    let mut cmd = Command::cargo_bin("sheetforge").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("SHEETFORGE_INSTRUCTIONS")
        .env_remove("SHEETFORGE_OUTPUT_DIR");
    cmd
}

fn fixture_files(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let instructions = dir.path().join("instructions.xlsx");
    let input = dir.path().join("dislocation.xlsx");
    fs::write(&instructions, common::instruction_workbook()).unwrap();
    fs::write(&input, common::data_workbook()).unwrap();
    (instructions, input)
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP / VERSION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_help() {
    sheetforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_version() {
    sheetforge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ═══════════════════════════════════════════════════════════════════════════
// PROCESS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_process_json_output() {
    let dir = TempDir::new().unwrap();
    let (instructions, input) = fixture_files(&dir);
    let out = dir.path().join("out");

    sheetforge()
        .arg("process")
        .arg(&input)
        .arg("--instructions")
        .arg(&instructions)
        .arg("--output-dir")
        .arg(&out)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"processedRows\": 3"))
        .stdout(predicate::str::contains("\"appliedRules\": 2"))
        .stdout(predicate::str::contains("TRANSFORA_dislocation_"));

    assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
}

#[test]
fn test_process_from_environment() {
    let dir = TempDir::new().unwrap();
    let (instructions, input) = fixture_files(&dir);
    let out = dir.path().join("env-out");

    sheetforge()
        .env("SHEETFORGE_INSTRUCTIONS", &instructions)
        .env("SHEETFORGE_OUTPUT_DIR", &out)
        .env("SHEETFORGE_FILE_PREFIX", "wagons")
        .arg("process")
        .arg(&input)
        .arg("--preview-email")
        .arg("--sender")
        .arg("ops@example.com")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing complete"))
        .stdout(predicate::str::contains("Дислокация: wagons_"))
        .stdout(predicate::str::contains("Отдел логистики"));

    let name = fs::read_dir(&out)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .file_name();
    assert!(name.to_string_lossy().starts_with("wagons_"));
}

#[test]
fn test_process_missing_instructions_fails() {
    let dir = TempDir::new().unwrap();
    let (_, input) = fixture_files(&dir);

    sheetforge()
        .arg("process")
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("instruction workbook"));
}

#[test]
fn test_process_corrupt_instructions_fails() {
    let dir = TempDir::new().unwrap();
    let (instructions, input) = fixture_files(&dir);
    fs::write(&instructions, b"not a workbook").unwrap();

    sheetforge()
        .arg("process")
        .arg(&input)
        .arg("-i")
        .arg(&instructions)
        .arg("-o")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Instruction parse failure"));
}

#[test]
fn test_sender_requires_preview() {
    let dir = TempDir::new().unwrap();
    let (instructions, input) = fixture_files(&dir);

    sheetforge()
        .arg("process")
        .arg(&input)
        .arg("-i")
        .arg(&instructions)
        .arg("--sender")
        .arg("ops@example.com")
        .assert()
        .failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// INSPECT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_inspect_summary() {
    let dir = TempDir::new().unwrap();
    let (instructions, _) = fixture_files(&dir);

    sheetforge()
        .arg("inspect")
        .arg(&instructions)
        .assert()
        .success()
        .stdout(predicate::str::contains("Columns (7)"))
        .stdout(predicate::str::contains("Replace rules (3)"))
        .stdout(predicate::str::contains("Instructions are valid"));
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let (instructions, _) = fixture_files(&dir);

    let output = sheetforge()
        .arg("inspect")
        .arg(&instructions)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["columns"].as_array().unwrap().len(), 7);
    assert_eq!(value["replace_rules"][0]["project_value"], "P1");
    assert_eq!(value["formatting"]["font_name"], "Arial");
}

#[test]
fn test_inspect_yaml() {
    let dir = TempDir::new().unwrap();
    let (instructions, _) = fixture_files(&dir);

    sheetforge()
        .arg("inspect")
        .arg(&instructions)
        .arg("-f")
        .arg("yaml")
        .assert()
        .success()
        .stdout(predicate::str::contains("is_date: true"))
        .stdout(predicate::str::contains("date_format: DD MMM YYYY"));
}

#[test]
fn test_inspect_corrupt_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xlsx");
    fs::write(&path, b"broken").unwrap();

    sheetforge()
        .arg("inspect")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Instruction parse failure"));
}
