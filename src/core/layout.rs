//! Column layout resolution for the encode direction

use super::coercion::json_to_cell;
use super::dates::DatePatterns;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{CellValue, Record};
use serde_json::Value;
use std::collections::HashSet;

/// Resolved columns and per-cell coerced rows of one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetLayout {
    /// A sheet with no resolvable column is left out of the workbook
    pub fn is_emittable(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// Union of record keys in first-seen order.
///
/// The first record's keys come first, then keys introduced by later
/// records in the order they appear.
pub fn resolve_columns(records: &[Record]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns = Vec::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Resolve a sheet's layout.
///
/// With `explicit`, exactly those columns are used in that order: record
/// keys outside the list are dropped and listed keys a record lacks render
/// Empty. Every cell is coerced on its own; columns carry no single type.
pub fn resolve_layout(
    name: &str,
    records: &[Record],
    explicit: Option<&[String]>,
    patterns: &DatePatterns,
) -> BridgeResult<SheetLayout> {
    let columns = match explicit {
        Some(list) => {
            check_unique(name, list)?;
            list.to_vec()
        }
        None => resolve_columns(records),
    };
    check_named(name, &columns)?;

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| match record.get(column) {
                    Some(value) => json_to_cell(value, patterns),
                    None => json_to_cell(&Value::Null, patterns),
                })
                .collect()
        })
        .collect();

    Ok(SheetLayout {
        name: name.to_string(),
        columns,
        rows,
    })
}

/// A blank header cell ahead of a named one cannot be decoded
fn check_named(sheet: &str, columns: &[String]) -> BridgeResult<()> {
    match columns.iter().position(|column| column.trim().is_empty()) {
        Some(idx) => Err(BridgeError::Validation(format!(
            "Sheet '{}': column {} has a blank name",
            sheet,
            idx + 1
        ))),
        None => Ok(()),
    }
}

fn check_unique(sheet: &str, columns: &[String]) -> BridgeResult<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(BridgeError::Validation(format!(
                "Format specification for sheet '{}' lists column '{}' more than once",
                sheet, column
            )));
        }
    }
    Ok(())
}
