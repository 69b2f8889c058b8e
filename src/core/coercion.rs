//! Explicit conversions between Cell Values and JSON values

use super::dates::{self, DatePatterns};
use crate::types::CellValue;
use serde_json::{Number, Value};

/// Largest integer magnitude an f64 cell holds exactly (2^53)
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_992;

/// Cell → JSON.
///
/// Integers become numbers without a fraction, dates become ISO-8601 strings,
/// Empty becomes null. Non-finite floats have no JSON form and become null.
pub fn cell_to_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::Boolean(b) => Value::Bool(*b),
        CellValue::Integer(i) => Value::Number(Number::from(*i)),
        CellValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        CellValue::Text(s) => Value::String(s.clone()),
        CellValue::DateTime(dt) => Value::String(dates::format_iso(dt)),
    }
}

/// JSON → Cell.
///
/// Nested arrays and objects are kept as canonical JSON text rather than
/// dropped. Integer literals outside ±2^53 are kept as text so no digit is
/// lost; float literals always stay numeric.
pub fn json_to_cell(value: &Value, patterns: &DatePatterns) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Boolean(*b),
        Value::Number(n) => number_to_cell(n),
        Value::String(s) => match patterns.parse(s) {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Text(s.clone()),
        },
        Value::Array(_) | Value::Object(_) => CellValue::Text(canonical_json(value)),
    }
}

fn number_to_cell(n: &Number) -> CellValue {
    if let Some(i) = n.as_i64() {
        return integer_cell(i);
    }
    if n.is_u64() {
        // above i64::MAX, so necessarily above 2^53
        return CellValue::Text(n.to_string());
    }
    // a float literal is already an f64, so a numeric cell holds it exactly
    match n.as_f64() {
        Some(f) => float_cell(f),
        None => CellValue::Text(n.to_string()),
    }
}

fn integer_cell(i: i64) -> CellValue {
    if i.abs_diff(0) <= MAX_SAFE_INTEGER as u64 {
        CellValue::Integer(i)
    } else {
        CellValue::Text(i.to_string())
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0
}

/// Numeric cell read from the binary format, where every number is an f64.
///
/// Integral values within ±2^53 come back as Integer so `1` stays `1`.
pub fn float_cell(f: f64) -> CellValue {
    if is_integral(f) && f.abs() <= MAX_SAFE_INTEGER as f64 {
        CellValue::Integer(f as i64)
    } else {
        CellValue::Float(f)
    }
}

/// Compact JSON with object keys sorted at every depth
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (idx, key) in keys.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                // a String always serializes
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Text form of a cell, used for header names and console output
pub fn cell_to_display(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::DateTime(dt) => dates::format_iso(dt),
        other => cell_to_json(other).to_string(),
    }
}
