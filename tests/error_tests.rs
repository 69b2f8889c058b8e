//! Error taxonomy tests

use sheetbridge::error::{BridgeError, ErrorKind};

#[test]
fn test_kind_names() {
    assert_eq!(ErrorKind::Format.as_str(), "FormatError");
    assert_eq!(ErrorKind::Schema.as_str(), "SchemaError");
    assert_eq!(ErrorKind::Validation.as_str(), "ValidationError");
    assert_eq!(ErrorKind::Internal.as_str(), "InternalError");
}

#[test]
fn test_display_prefixes() {
    assert_eq!(
        BridgeError::Format("bad zip".into()).to_string(),
        "Format error: bad zip"
    );
    assert_eq!(
        BridgeError::Schema("duplicate header".into()).to_string(),
        "Schema error: duplicate header"
    );
    assert_eq!(
        BridgeError::Internal("boom".into()).to_string(),
        "Internal error: boom"
    );
}

#[test]
fn test_yaml_errors_are_validation() {
    let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
    let err: BridgeError = yaml_err.into();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().starts_with("YAML parsing error"));
}

#[test]
fn test_error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&BridgeError::Validation("x".into()));

    let anyhow_err: anyhow::Error = BridgeError::Schema("gap".into()).into();
    assert!(anyhow_err.to_string().contains("gap"));
}
