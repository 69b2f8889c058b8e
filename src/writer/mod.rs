use crate::error::BridgeResult;
use crate::parser::is_yaml_path;
use crate::types::{DecodeOutput, Document};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Pretty-printed JSON of a Document
pub fn to_json_string(document: &Document) -> BridgeResult<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// YAML rendering of a Document
pub fn to_yaml_string(document: &Document) -> BridgeResult<String> {
    Ok(serde_yaml::to_string(document)?)
}

/// Render decode output as text.
///
/// With `with_schema` the `{json, schema}` envelope is rendered, otherwise
/// only the Document.
pub fn render_decode_output(
    output: &DecodeOutput,
    with_schema: bool,
    yaml: bool,
) -> BridgeResult<String> {
    if with_schema {
        render(output, yaml)
    } else {
        render(&output.document, yaml)
    }
}

fn render<T: Serialize>(value: &T, yaml: bool) -> BridgeResult<String> {
    if yaml {
        Ok(serde_yaml::to_string(value)?)
    } else {
        let mut text = serde_json::to_string_pretty(value)?;
        text.push('\n');
        Ok(text)
    }
}

/// Write decode output to `path`; `.yaml`/`.yml` selects YAML, anything else JSON
pub fn write_decode_output(path: &Path, output: &DecodeOutput, with_schema: bool) -> BridgeResult<()> {
    let text = render_decode_output(output, with_schema, is_yaml_path(path))?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnSchema, ColumnType, Record, SheetSchema, WorkbookSchema};
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_output() -> DecodeOutput {
        let mut record = Record::new();
        record.insert("name".to_string(), json!("Ada"));
        record.insert("age".to_string(), json!(36));
        let mut document = Document::new();
        document.add_sheet("People", vec![record]);

        let mut schema = WorkbookSchema::new();
        schema.add_sheet(
            "People".to_string(),
            SheetSchema::new(vec![
                ColumnSchema::new("name", ColumnType::String, false),
                ColumnSchema::new("age", ColumnType::Integer, false),
            ]),
        );
        DecodeOutput { document, schema }
    }

    #[test]
    fn test_json_document_only() {
        let text = render_decode_output(&sample_output(), false, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"People": [{"name": "Ada", "age": 36}]}));
    }

    #[test]
    fn test_json_with_schema_envelope() {
        let text = render_decode_output(&sample_output(), true, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["json"]["People"][0]["age"], json!(36));
        assert_eq!(value["schema"]["People"][1]["type"], json!("integer"));
    }

    #[test]
    fn test_yaml_rendering() {
        let text = to_yaml_string(&sample_output().document).unwrap();
        assert!(text.contains("People:"));
        assert!(text.contains("name: Ada"));
    }

    #[test]
    fn test_write_decode_output_picks_format_from_extension() {
        let dir = TempDir::new().unwrap();
        let yaml_path = dir.path().join("out.yaml");
        let json_path = dir.path().join("out.json");

        write_decode_output(&yaml_path, &sample_output(), false).unwrap();
        write_decode_output(&json_path, &sample_output(), false).unwrap();

        let yaml = fs::read_to_string(yaml_path).unwrap();
        let json_text = fs::read_to_string(json_path).unwrap();
        assert!(yaml.contains("age: 36"));
        assert!(json_text.trim_start().starts_with('{'));
    }
}
