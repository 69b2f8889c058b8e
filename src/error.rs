use std::fmt;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Error taxonomy surfaced to callers.
///
/// Every [`BridgeError`] collapses to exactly one kind. None of them are
/// retryable: conversions are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Binary container unreadable or corrupt
    Format,
    /// Structurally ambiguous input (duplicate or gapped headers)
    Schema,
    /// Semantically empty or invalid request
    Validation,
    /// Unexpected failure
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Format => "FormatError",
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Internal => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BridgeError {
    /// Classify this error into the caller-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Format(_) => ErrorKind::Format,
            BridgeError::Schema(_) => ErrorKind::Schema,
            BridgeError::Validation(_) | BridgeError::Json(_) | BridgeError::Yaml(_) => {
                ErrorKind::Validation
            }
            BridgeError::Internal(_) | BridgeError::Io(_) => ErrorKind::Internal,
        }
    }
}
