//! Excel import/export module
//!
//! This module provides bidirectional Excel ↔ JSON conversion:
//! - Import: workbook (.xlsx/.xls) → Document + inferred Schema
//! - Export: Document (+ optional Format Specification) → .xlsx

mod exporter;
mod importer;

/// Prefix of the workbook-level defined name that records how many rows a
/// written sheet spans. The suffix is the sheet's position in the workbook.
pub(crate) const ROW_EXTENT_NAME: &str = "_sheetbridge_rows_";

pub use exporter::{check_sheet_names, encode, ExcelExporter, MAX_COLUMNS, MAX_ROWS};
pub use importer::{column_letter, decode, Container, ExcelImporter};
