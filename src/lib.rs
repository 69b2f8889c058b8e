//! Sheetbridge - Excel ⟷ JSON conversion with schema inference
//!
//! Decodes workbooks into a Document (sheet name → records) plus an
//! inferred per-column schema, and encodes Documents back into `.xlsx`
//! workbooks, optionally with an explicit column layout per sheet.
//!
//! # Features
//!
//! - Column type inference over the lattice boolean ⊏ integer ⊏ float ⊏ string
//! - Date cells and ISO date strings round-trip as dates
//! - Explicit Format Specifications control column order and subset
//! - HTTP API (`/api/excel-to-json`, `/api/json-to-excel`) and CLI
//!
//! # Example
//!
//! ```
//! use sheetbridge::excel::{decode, encode};
//! use sheetbridge::parser::parse_document;
//! use sheetbridge::types::ColumnType;
//! use serde_json::json;
//!
//! let document = parse_document(&json!({"Sheet1": [{"a": 1}, {"a": 2.5}]}))?;
//! let bytes = encode(&document, None)?;
//!
//! let decoded = decode(&bytes)?;
//! let column = decoded.schema.sheet("Sheet1").and_then(|s| s.column("a"));
//! assert_eq!(column.map(|c| c.column_type), Some(ColumnType::Float));
//! # Ok::<(), sheetbridge::error::BridgeError>(())
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{BridgeError, BridgeResult, ErrorKind};
pub use types::{
    CellValue, ColumnSchema, ColumnType, DecodeOutput, Document, FormatSpec, Record, SheetSchema,
    WorkbookSchema,
};
