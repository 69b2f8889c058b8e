//! CLI Integration Tests
//!
//! Runs the `sheetbridge` binary against temp files using assert_cmd.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn sheetbridge() -> Command {
    Command::cargo_bin("sheetbridge").unwrap()
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

/// Encode `value` into `<dir>/book.xlsx` via the CLI and return its path
fn encoded_workbook(dir: &TempDir, value: &Value) -> PathBuf {
    let input = write_json(dir, "input.json", value);
    let output = dir.path().join("book.xlsx");
    sheetbridge()
        .arg("encode")
        .arg(&input)
        .arg(&output)
        .assert()
        .success();
    output
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    sheetbridge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheetbridge"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    sheetbridge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_no_subcommand_fails() {
    sheetbridge().assert().failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// ENCODE / DECODE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_encode_then_decode_to_stdout() {
    let dir = TempDir::new().unwrap();
    let workbook = encoded_workbook(
        &dir,
        &json!({"Orders": [{"id": 1, "total": 9.99}, {"id": 2, "total": 15}]}),
    );

    let output = sheetbridge().arg("decode").arg(&workbook).output().unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        json!({"Orders": [{"id": 1, "total": 9.99}, {"id": 2, "total": 15}]})
    );
}

#[test]
fn test_decode_with_schema_to_file() {
    let dir = TempDir::new().unwrap();
    let workbook = encoded_workbook(&dir, &json!({"S": [{"flag": true}, {"flag": null}]}));
    let out = dir.path().join("out.json");

    sheetbridge()
        .arg("decode")
        .arg(&workbook)
        .arg("-o")
        .arg(&out)
        .arg("--with-schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("Decode Complete"));

    let value: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(
        value["schema"]["S"][0],
        json!({"name": "flag", "type": "boolean", "nullable": true})
    );
}

#[test]
fn test_decode_to_yaml() {
    let dir = TempDir::new().unwrap();
    let workbook = encoded_workbook(&dir, &json!({"S": [{"name": "Ada"}]}));
    let out = dir.path().join("out.yaml");

    sheetbridge()
        .args(["decode", "-v"])
        .arg(&workbook)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("name: Ada"));
}

#[test]
fn test_encode_with_format_spec() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "doc.json", &json!({"Sheet1": [{"a": 1, "b": 2}]}));
    let format = write_json(&dir, "format.json", &json!({"Sheet1": ["b"]}));
    let xlsx = dir.path().join("out.xlsx");

    sheetbridge()
        .arg("encode")
        .arg(&input)
        .arg(&xlsx)
        .arg("-f")
        .arg(&format)
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encode Complete"));

    let output = sheetbridge().arg("decode").arg(&xlsx).output().unwrap();
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, json!({"Sheet1": [{"b": 2}]}));
}

#[test]
fn test_encode_yaml_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.yaml");
    fs::write(&input, "Sheet1:\n  - name: Ada\n    joined: 2020-01-02\n").unwrap();
    let xlsx = dir.path().join("out.xlsx");

    sheetbridge()
        .arg("encode")
        .arg(&input)
        .arg(&xlsx)
        .assert()
        .success();

    sheetbridge()
        .arg("inspect")
        .arg(&xlsx)
        .assert()
        .success()
        .stdout(predicate::str::contains("joined"))
        .stdout(predicate::str::contains("date"));
}

#[test]
fn test_encode_custom_date_pattern() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "doc.json", &json!({"S": [{"d": "15/01/2024"}]}));
    let xlsx = dir.path().join("out.xlsx");

    sheetbridge()
        .arg("encode")
        .arg(&input)
        .arg(&xlsx)
        .arg("--date-pattern")
        .arg(r"^(?P<day>\d{2})/(?P<month>\d{2})/(?P<year>\d{4})$")
        .assert()
        .success();

    let output = sheetbridge().arg("decode").arg(&xlsx).output().unwrap();
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["S"][0]["d"], json!("2024-01-15"));
}

// ═══════════════════════════════════════════════════════════════════════════
// ERROR PATHS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_encode_empty_document_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "empty.json", &json!({}));

    sheetbridge()
        .arg("encode")
        .arg(&input)
        .arg(dir.path().join("out.xlsx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sheet data to encode"));
}

#[test]
fn test_decode_not_a_workbook_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("fake.xlsx");
    fs::write(&input, "not a workbook").unwrap();

    sheetbridge()
        .arg("decode")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Format error"));
}

#[test]
fn test_decode_missing_file_fails() {
    sheetbridge()
        .args(["decode", "/nonexistent/sheetbridge/input.xlsx"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_date_pattern_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_json(&dir, "doc.json", &json!({"S": [{"a": 1}]}));

    sheetbridge()
        .arg("encode")
        .arg(&input)
        .arg(dir.path().join("out.xlsx"))
        .args(["--date-pattern", r"^\d+$"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("year"));
}
