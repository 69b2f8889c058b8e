//! Type model, schema inference and layout resolution tests

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use sheetbridge::core::{
    cell_to_json, infer_column, infer_sheet, json_to_cell, resolve_columns, resolve_layout,
    DatePatterns, TypeAccumulator,
};
use sheetbridge::types::{CellValue, ColumnType, Record};

const ALL_TYPES: [ColumnType; 6] = [
    ColumnType::Boolean,
    ColumnType::Integer,
    ColumnType::Float,
    ColumnType::String,
    ColumnType::Date,
    ColumnType::Mixed,
];

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn date(y: i32, m: u32, d: u32) -> CellValue {
    CellValue::DateTime(
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// TYPE LATTICE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_widen_is_commutative_and_idempotent() {
    for a in ALL_TYPES {
        assert_eq!(a.widen(a), a.output_type());
        for b in ALL_TYPES {
            assert_eq!(a.widen(b), b.widen(a), "{a:?} ⊔ {b:?}");
        }
    }
}

#[test]
fn test_widen_is_associative() {
    for a in ALL_TYPES {
        for b in ALL_TYPES {
            for c in ALL_TYPES {
                assert_eq!(a.widen(b).widen(c), a.widen(b.widen(c)), "{a:?} {b:?} {c:?}");
            }
        }
    }
}

#[test]
fn test_widen_chain() {
    assert_eq!(ColumnType::Boolean.widen(ColumnType::Integer), ColumnType::Integer);
    assert_eq!(ColumnType::Integer.widen(ColumnType::Float), ColumnType::Float);
    assert_eq!(ColumnType::Float.widen(ColumnType::String), ColumnType::String);
    assert_eq!(ColumnType::Date.widen(ColumnType::Integer), ColumnType::String);
    assert_eq!(ColumnType::Date.widen(ColumnType::Date), ColumnType::Date);
    assert_eq!(ColumnType::Mixed.widen(ColumnType::Boolean), ColumnType::String);
}

// ═══════════════════════════════════════════════════════════════════════════
// INFERENCE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_infer_all_empty_column() {
    let schema = infer_column("x", &[CellValue::Empty, CellValue::Empty]);
    assert_eq!(schema.column_type, ColumnType::String);
    assert!(schema.nullable);

    let schema = infer_column("x", Vec::<CellValue>::new().iter());
    assert_eq!(schema.column_type, ColumnType::String);
    assert!(schema.nullable);
}

#[test]
fn test_infer_dates_stay_dates() {
    let cells = [date(2024, 1, 1), CellValue::Empty, date(2024, 2, 1)];
    let schema = infer_column("d", &cells);
    assert_eq!(schema.column_type, ColumnType::Date);
    assert!(schema.nullable);
}

#[test]
fn test_infer_date_with_number_is_string() {
    let cells = [date(2024, 1, 1), CellValue::Integer(3)];
    assert_eq!(infer_column("d", &cells).column_type, ColumnType::String);
}

#[test]
fn test_infer_order_independent() {
    let cells = vec![
        CellValue::Boolean(true),
        CellValue::Integer(4),
        CellValue::Empty,
        CellValue::Float(0.5),
    ];
    let forward = infer_column("c", &cells);
    let reversed: Vec<CellValue> = cells.iter().rev().cloned().collect();
    let backward = infer_column("c", &reversed);

    assert_eq!(forward, backward);
    assert_eq!(forward.column_type, ColumnType::Float);
    assert!(forward.nullable);
}

#[test]
fn test_accumulator_counts_observations() {
    let mut acc = TypeAccumulator::new();
    acc.observe(&CellValue::Integer(1));
    acc.observe(&CellValue::Empty);
    assert_eq!(acc.observed(), 2);
    let schema = acc.finish("n");
    assert_eq!(schema.name, "n");
    assert_eq!(schema.column_type, ColumnType::Integer);
    assert!(schema.nullable);
}

#[test]
fn test_infer_sheet_keeps_header_order() {
    let header = vec!["b".to_string(), "a".to_string()];
    let columns = vec![
        vec![CellValue::Text("x".into())],
        vec![CellValue::Boolean(false)],
    ];
    let schema = infer_sheet(&header, &columns);
    let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(schema.columns[1].column_type, ColumnType::Boolean);
}

#[test]
fn test_inference_is_idempotent_over_json() {
    let cells = vec![CellValue::Integer(1), CellValue::Float(2.5), CellValue::Empty];
    let first = infer_column("v", &cells);

    let patterns = DatePatterns::default();
    let again: Vec<CellValue> = cells
        .iter()
        .map(|c| json_to_cell(&cell_to_json(c), &patterns))
        .collect();
    assert_eq!(infer_column("v", &again), first);
}

// ═══════════════════════════════════════════════════════════════════════════
// LAYOUT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_layout_first_seen_union() {
    let records = vec![
        record(json!({"id": 1, "name": "a"})),
        record(json!({"extra": true, "id": 2})),
        record(json!({"name": "c", "late": 0})),
    ];
    assert_eq!(resolve_columns(&records), vec!["id", "name", "extra", "late"]);
}

#[test]
fn test_layout_is_deterministic() {
    let records = vec![record(json!({"b": 1, "a": 2})), record(json!({"c": 3}))];
    let patterns = DatePatterns::default();
    let first = resolve_layout("S", &records, None, &patterns).unwrap();
    let second = resolve_layout("S", &records, None, &patterns).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_layout_explicit_columns() {
    let records = vec![record(json!({"a": 1, "b": 2}))];
    let explicit = vec!["b".to_string(), "missing".to_string()];
    let layout =
        resolve_layout("S", &records, Some(explicit.as_slice()), &DatePatterns::default()).unwrap();

    assert_eq!(layout.columns, explicit);
    assert_eq!(layout.rows, vec![vec![CellValue::Integer(2), CellValue::Empty]]);
}

#[test]
fn test_layout_empty_sheet_not_emittable() {
    let layout = resolve_layout("S", &[], None, &DatePatterns::default()).unwrap();
    assert!(!layout.is_emittable());

    let explicit = vec!["a".to_string()];
    let layout = resolve_layout("S", &[], Some(explicit.as_slice()), &DatePatterns::default()).unwrap();
    assert!(layout.is_emittable());
    assert!(layout.rows.is_empty());
}

#[test]
fn test_layout_cells_coerced_independently() {
    let records = vec![
        record(json!({"v": "2024-03-01"})),
        record(json!({"v": "hello"})),
        record(json!({"v": [1, 2]})),
    ];
    let layout = resolve_layout("S", &records, None, &DatePatterns::default()).unwrap();
    assert_eq!(layout.rows[0][0], date(2024, 3, 1));
    assert_eq!(layout.rows[1][0], CellValue::Text("hello".into()));
    assert_eq!(layout.rows[2][0], CellValue::Text("[1,2]".into()));
}

#[test]
fn test_layout_record_without_columns() {
    let records = vec![Map::new()];
    let layout = resolve_layout("S", &records, None, &DatePatterns::default()).unwrap();
    assert!(layout.columns.is_empty());
    assert_eq!(layout.rows, vec![Vec::<CellValue>::new()]);
}
