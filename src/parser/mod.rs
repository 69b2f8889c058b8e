use crate::error::{BridgeError, BridgeResult};
use crate::types::{Document, FormatSpec, Record};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::path::Path;

const DOCUMENT_SCHEMA: &str = include_str!("../../schema/document.schema.json");
const FORMAT_SCHEMA: &str = include_str!("../../schema/format.schema.json");

/// Parsed body of an encode request: `{ "json": Document, "format": FormatSpec | null }`
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub document: Document,
    pub format: Option<FormatSpec>,
}

/// Parse a Document from its JSON value.
///
/// The value must be an object mapping sheet names to arrays of objects.
/// Sheet order and key order are kept as written.
///
/// # Example
/// ```
/// use sheetbridge::parser::parse_document;
/// use serde_json::json;
///
/// let doc = parse_document(&json!({"Sheet1": [{"a": 1}]}))?;
/// assert_eq!(doc.sheet_names(), vec!["Sheet1"]);
/// # Ok::<(), sheetbridge::error::BridgeError>(())
/// ```
pub fn parse_document(value: &Value) -> BridgeResult<Document> {
    validate_against_schema(DOCUMENT_SCHEMA, value, "Document")?;

    let mut document = Document::new();
    if let Value::Object(sheets) = value {
        for (name, rows) in sheets {
            let records: Vec<Record> = rows
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_object().cloned())
                        .collect()
                })
                .unwrap_or_default();
            document.add_sheet(name.clone(), records);
        }
    }
    Ok(document)
}

/// Parse an optional Format Specification. `null` means "resolve automatically".
pub fn parse_format_spec(value: &Value) -> BridgeResult<Option<FormatSpec>> {
    if value.is_null() {
        return Ok(None);
    }
    validate_against_schema(FORMAT_SCHEMA, value, "Format specification")?;
    let spec: FormatSpec = serde_json::from_value(value.clone())
        .map_err(|e| BridgeError::Validation(format!("Invalid format specification: {}", e)))?;
    Ok(Some(spec))
}

/// Parse the raw body of an encode request
pub fn parse_encode_request(body: &[u8]) -> BridgeResult<EncodeRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(BridgeError::Validation("request body is empty".to_string()));
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| BridgeError::Validation(format!("Invalid JSON: {}", e)))?;

    let Value::Object(mut fields) = value else {
        return Err(BridgeError::Validation(
            "request body must be a JSON object with a 'json' member".to_string(),
        ));
    };

    let document = match fields.remove("json") {
        Some(Value::Null) | None => {
            return Err(BridgeError::Validation(
                "request is missing the 'json' document".to_string(),
            ))
        }
        Some(doc) => parse_document(&doc)?,
    };
    let format = match fields.remove("format") {
        Some(spec) => parse_format_spec(&spec)?,
        None => None,
    };

    Ok(EncodeRequest { document, format })
}

/// Read a JSON or YAML value from disk (YAML for `.yaml`/`.yml`)
pub fn read_value_file(path: &Path) -> BridgeResult<Value> {
    let content = std::fs::read_to_string(path)?;
    if is_yaml_path(path) {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        serde_json::from_str(&content).map_err(|e| {
            BridgeError::Validation(format!("Invalid JSON in {}: {}", path.display(), e))
        })
    }
}

/// Read a Document file for encoding
pub fn read_document_file(path: &Path) -> BridgeResult<Document> {
    parse_document(&read_value_file(path)?)
}

/// Read a Format Specification file
pub fn read_format_file(path: &Path) -> BridgeResult<Option<FormatSpec>> {
    parse_format_spec(&read_value_file(path)?)
}

pub(crate) fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref(),
        Some("yaml") | Some("yml")
    )
}

/// Validate a JSON value against one of the embedded JSON Schemas
fn validate_against_schema(schema_str: &str, value: &Value, what: &str) -> BridgeResult<()> {
    let schema_value: Value = serde_json::from_str(schema_str)
        .map_err(|e| BridgeError::Internal(format!("Failed to parse schema: {}", e)))?;

    let compiled_schema = JSONSchema::compile(&schema_value)
        .map_err(|e| BridgeError::Internal(format!("Failed to compile schema: {}", e)))?;

    if let Err(errors) = compiled_schema.validate(value) {
        let error_messages: Vec<String> = errors
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    format!("  - {}", e)
                } else {
                    format!("  - {} (at {})", e, path)
                }
            })
            .collect();
        return Err(BridgeError::Validation(format!(
            "{} does not match the expected shape:\n{}",
            what,
            error_messages.join("\n")
        )));
    }

    Ok(())
}
