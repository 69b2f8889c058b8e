use chrono::NaiveDateTime;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

//==============================================================================
// Cell Values (binary side)
//==============================================================================

/// A single spreadsheet cell. Exactly one tag at a time; changing tags only
/// happens through the explicit coercions in [`crate::core::coercion`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Date/Time, held to whole-second precision
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The schema type this cell contributes, or `None` for Empty
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            CellValue::Empty => None,
            CellValue::Boolean(_) => Some(ColumnType::Boolean),
            CellValue::Integer(_) => Some(ColumnType::Integer),
            CellValue::Float(_) => Some(ColumnType::Float),
            CellValue::Text(_) => Some(ColumnType::String),
            CellValue::DateTime(_) => Some(ColumnType::Date),
        }
    }
}

//==============================================================================
// Type Lattice
//==============================================================================

/// Inferred column type.
///
/// Widening order is `boolean ⊏ integer ⊏ float ⊏ string`. `date` sits
/// beside the numeric chain and only widens to `string`. `mixed` is kept for
/// schemas that carry it explicitly; it is rendered as a string column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    String,
    Date,
    Mixed,
}

impl ColumnType {
    /// Position on the boolean → string chain (`None` for date/mixed)
    fn rank(self) -> Option<u8> {
        match self {
            ColumnType::Boolean => Some(0),
            ColumnType::Integer => Some(1),
            ColumnType::Float => Some(2),
            ColumnType::String => Some(3),
            ColumnType::Date | ColumnType::Mixed => None,
        }
    }

    /// Least upper bound of two types. Associative and commutative.
    pub fn widen(self, other: ColumnType) -> ColumnType {
        if self == ColumnType::Mixed || other == ColumnType::Mixed {
            return ColumnType::String;
        }
        if self == other {
            return self;
        }
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => {
                if a >= b {
                    self
                } else {
                    other
                }
            }
            // date against anything that is not date
            _ => ColumnType::String,
        }
    }

    /// Type used when rendering values of this column
    pub fn output_type(self) -> ColumnType {
        match self {
            ColumnType::Mixed => ColumnType::String,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::String => "string",
            ColumnType::Date => "date",
            ColumnType::Mixed => "mixed",
        }
    }
}

//==============================================================================
// Schemas
//==============================================================================

/// Inferred type and nullability of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable,
        }
    }
}

/// Ordered column schemas of one sheet
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetSchema {
    pub columns: Vec<ColumnSchema>,
}

impl SheetSchema {
    pub fn new(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Sheet name → Sheet Schema, in workbook order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkbookSchema {
    pub sheets: Vec<(String, SheetSchema)>,
}

impl WorkbookSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, name: String, schema: SheetSchema) {
        self.sheets.push((name, schema));
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetSchema> {
        self.sheets
            .iter()
            .find(|(sheet_name, _)| sheet_name == name)
            .map(|(_, schema)| schema)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl Serialize for WorkbookSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sheets.len()))?;
        for (name, schema) in &self.sheets {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

//==============================================================================
// Document (structured side)
//==============================================================================

/// One row as column name → JSON value. Key order is insertion order.
pub type Record = serde_json::Map<String, Value>;

/// Sheet name → sequence of Records, in sheet order.
///
/// Built fresh for every conversion and never shared between requests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub sheets: Vec<(String, Vec<Record>)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet. A sheet with the same name is replaced in place.
    pub fn add_sheet(&mut self, name: impl Into<String>, records: Vec<Record>) {
        let name = name.into();
        if let Some(slot) = self.sheets.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = records;
        } else {
            self.sheets.push((name, records));
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&[Record]> {
        self.sheets
            .iter()
            .find(|(sheet_name, _)| sheet_name == name)
            .map(|(_, records)| records.as_slice())
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Total number of records across all sheets
    pub fn record_count(&self) -> usize {
        self.sheets.iter().map(|(_, records)| records.len()).sum()
    }

    /// Convert into the JSON object exchanged at the boundary
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.sheets.len());
        for (name, records) in &self.sheets {
            let rows = records.iter().cloned().map(Value::Object).collect();
            map.insert(name.clone(), Value::Array(rows));
        }
        Value::Object(map)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sheets.len()))?;
        for (name, records) in &self.sheets {
            map.serialize_entry(name, records)?;
        }
        map.end()
    }
}

/// Caller-supplied column layout: sheet name → ordered column names
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatSpec {
    pub sheets: HashMap<String, Vec<String>>,
}

impl FormatSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, columns: Vec<String>) -> Self {
        self.sheets.insert(name.into(), columns);
        self
    }

    pub fn columns_for(&self, sheet: &str) -> Option<&[String]> {
        self.sheets.get(sheet).map(|c| c.as_slice())
    }
}

//==============================================================================
// Workbook (binary side, in memory)
//==============================================================================

/// A named grid of cells. Rows may have differing lengths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Ordered sheets read from a binary container
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }
}

/// Result of decoding a workbook: `{ "json": ..., "schema": ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeOutput {
    #[serde(rename = "json")]
    pub document: Document,
    pub schema: WorkbookSchema,
}
