//! Document and Format Specification file parsing tests

use pretty_assertions::assert_eq;
use serde_json::json;
use sheetbridge::error::{BridgeError, ErrorKind};
use sheetbridge::parser::{
    parse_encode_request, read_document_file, read_format_file, read_value_file,
};
use std::fs;
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// FILE READING
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_read_json_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.json");
    fs::write(&path, r#"{"B": [{"y": 1, "x": 2}], "A": []}"#).unwrap();

    let document = read_document_file(&path).unwrap();
    assert_eq!(document.sheet_names(), vec!["B", "A"]);
    assert_eq!(document.to_value(), json!({"B": [{"y": 1, "x": 2}], "A": []}));
}

#[test]
fn test_read_yaml_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.yml");
    fs::write(
        &path,
        "Inventory:\n  - sku: A-1\n    qty: 4\n    tags: [red, blue]\n  - sku: B-2\n    qty: ~\n",
    )
    .unwrap();

    let document = read_document_file(&path).unwrap();
    assert_eq!(
        document.to_value(),
        json!({"Inventory": [
            {"sku": "A-1", "qty": 4, "tags": ["red", "blue"]},
            {"sku": "B-2", "qty": null}
        ]})
    );
}

#[test]
fn test_read_document_wrong_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.json");
    fs::write(&path, r#"{"S": "not rows"}"#).unwrap();

    let err = read_document_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("Document"));
}

#[test]
fn test_read_document_invalid_json_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{").unwrap();

    let err = read_document_file(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"), "{err}");
}

#[test]
fn test_read_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "S: [unclosed").unwrap();

    let err = read_value_file(&path).unwrap_err();
    assert!(matches!(err, BridgeError::Yaml(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_read_missing_file() {
    let err = read_document_file(std::path::Path::new("/nonexistent/doc.json")).unwrap_err();
    assert!(matches!(err, BridgeError::Io(_)));
}

#[test]
fn test_read_format_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("format.yaml");
    fs::write(&path, "Sheet1:\n  - b\n  - a\n").unwrap();

    let spec = read_format_file(&path).unwrap().unwrap();
    assert_eq!(
        spec.columns_for("Sheet1"),
        Some(&["b".to_string(), "a".to_string()][..])
    );
    assert_eq!(spec.columns_for("Other"), None);
}

#[test]
fn test_read_null_format_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("format.json");
    fs::write(&path, "null").unwrap();
    assert!(read_format_file(&path).unwrap().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// ENCODE REQUESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_encode_request_with_format() {
    let body = json!({"json": {"S": [{"a": 1}]}, "format": {"S": ["a"]}}).to_string();
    let request = parse_encode_request(body.as_bytes()).unwrap();
    assert_eq!(request.document.record_count(), 1);
    assert!(request.format.is_some());
}

#[test]
fn test_encode_request_bad_format() {
    let body = json!({"json": {"S": [{"a": 1}]}, "format": {"S": "a"}}).to_string();
    let err = parse_encode_request(body.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_encode_request_ignores_unknown_members() {
    let body = json!({"json": {"S": []}, "format": null, "client": "web"}).to_string();
    assert!(parse_encode_request(body.as_bytes()).is_ok());
}
