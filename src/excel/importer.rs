//! Excel importer implementation - workbook bytes → Document + Schema

use super::exporter::MAX_ROWS;
use super::ROW_EXTENT_NAME;
use crate::core::coercion::{cell_to_display, cell_to_json, float_cell};
use crate::core::inference::infer_sheet;
use crate::core::ConvertOptions;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{
    CellValue, DecodeOutput, Document, Record, Sheet, SheetSchema, Workbook, WorkbookSchema,
};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Binary container families the importer accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Office Open XML / OpenDocument (`.xlsx`, `.xlsm`, `.xlsb`, `.ods`)
    Zip,
    /// OLE2 compound file (`.xls`)
    Cfb,
}

impl Container {
    /// Identify the container from its magic bytes
    pub fn sniff(bytes: &[u8]) -> BridgeResult<Self> {
        if bytes.is_empty() {
            return Err(BridgeError::Validation("empty workbook payload".to_string()));
        }
        if bytes.starts_with(&ZIP_MAGIC) {
            Ok(Container::Zip)
        } else if bytes.starts_with(&CFB_MAGIC) {
            Ok(Container::Cfb)
        } else {
            Err(BridgeError::Format(
                "unrecognised workbook container (expected .xlsx or .xls content)".to_string(),
            ))
        }
    }
}

/// Excel importer: reads a workbook, maps every sheet to records and infers
/// a schema per column.
pub struct ExcelImporter {
    options: ConvertOptions,
}

impl Default for ExcelImporter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Decode workbook bytes
    pub fn decode(&self, bytes: &[u8]) -> BridgeResult<DecodeOutput> {
        let workbook = self.read_workbook(bytes)?;
        self.decode_workbook(&workbook)
    }

    /// Decode a workbook file from disk
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> BridgeResult<DecodeOutput> {
        let bytes = std::fs::read(path.as_ref())?;
        self.decode(&bytes)
    }

    /// Read every sheet's used range into memory, in workbook order
    pub fn read_workbook(&self, bytes: &[u8]) -> BridgeResult<Workbook> {
        let container = Container::sniff(bytes)?;
        debug!(?container, size = bytes.len(), "opening workbook");

        let mut source = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| BridgeError::Format(format!("Failed to open workbook: {}", e)))?;

        let extents = row_extents(source.defined_names());
        let mut workbook = Workbook::new();
        let sheet_names = source.sheet_names().to_vec();
        for (index, sheet_name) in sheet_names.into_iter().enumerate() {
            let range = source.worksheet_range(&sheet_name).map_err(|e| {
                BridgeError::Format(format!("Failed to read sheet '{}': {}", sheet_name, e))
            })?;
            let mut rows: Vec<Vec<CellValue>> = range
                .rows()
                .map(|row| row.iter().map(|cell| self.convert_cell(cell)).collect())
                .collect();

            // rows past the used range that held only empty cells
            if let Some(&extent) = extents.get(&index) {
                let start_row = range.start().map_or(0, |(row, _)| row as usize);
                let expected = extent.saturating_sub(start_row);
                if expected > rows.len() {
                    debug!(sheet = %sheet_name, rows = expected - rows.len(), "restoring empty rows");
                    rows.resize_with(expected, Vec::new);
                }
            }
            workbook.add_sheet(Sheet::with_rows(sheet_name, rows));
        }

        Ok(workbook)
    }

    /// Decode an in-memory workbook.
    ///
    /// Fails as a whole on the first failing sheet (in sheet order).
    pub fn decode_workbook(&self, workbook: &Workbook) -> BridgeResult<DecodeOutput> {
        let decoded: Vec<BridgeResult<(Vec<Record>, SheetSchema)>> =
            if self.options.parallel && workbook.sheets.len() > 1 {
                workbook
                    .sheets
                    .par_iter()
                    .map(|sheet| self.decode_sheet(sheet))
                    .collect()
            } else {
                workbook
                    .sheets
                    .iter()
                    .map(|sheet| self.decode_sheet(sheet))
                    .collect()
            };

        let mut document = Document::new();
        let mut schema = WorkbookSchema::new();
        for (sheet, result) in workbook.sheets.iter().zip(decoded) {
            let (records, sheet_schema) = result?;
            document.add_sheet(sheet.name.clone(), records);
            schema.add_sheet(sheet.name.clone(), sheet_schema);
        }

        Ok(DecodeOutput { document, schema })
    }

    /// Decode one sheet: first row is the header, the rest become records
    pub fn decode_sheet(&self, sheet: &Sheet) -> BridgeResult<(Vec<Record>, SheetSchema)> {
        let Some((header_row, data_rows)) = sheet.rows.split_first() else {
            debug!(sheet = %sheet.name, "sheet has no rows");
            return Ok((Vec::new(), SheetSchema::default()));
        };

        let header = self.resolve_header(&sheet.name, header_row)?;
        let width = header.len();
        if width == 0 {
            if data_rows.iter().flatten().any(|cell| !cell.is_empty()) {
                warn!(sheet = %sheet.name, "sheet has data but no header; data discarded");
            }
            return Ok((Vec::new(), SheetSchema::default()));
        }

        let mut columns: Vec<Vec<CellValue>> = vec![Vec::with_capacity(data_rows.len()); width];
        let mut records = Vec::with_capacity(data_rows.len());
        let mut discarded_rows = 0usize;

        for row in data_rows {
            if row.iter().skip(width).any(|cell| !cell.is_empty()) {
                discarded_rows += 1;
            }

            let mut record = Record::with_capacity(width);
            for (col_idx, name) in header.iter().enumerate() {
                // short rows are padded with Empty
                let cell = row.get(col_idx).cloned().unwrap_or_default();
                record.insert(name.clone(), cell_to_json(&cell));
                columns[col_idx].push(cell);
            }
            records.push(record);
        }

        if discarded_rows > 0 {
            warn!(
                sheet = %sheet.name,
                rows = discarded_rows,
                "cells beyond the last header column were discarded"
            );
        }

        let schema = infer_sheet(&header, &columns);
        debug!(
            sheet = %sheet.name,
            columns = width,
            records = records.len(),
            "decoded sheet"
        );
        Ok((records, schema))
    }

    /// Validate the header row and return the column names.
    ///
    /// Trailing blank header cells are dropped. A blank cell followed by a
    /// named one, or a repeated name, is ambiguous and rejected.
    fn resolve_header(&self, sheet_name: &str, cells: &[CellValue]) -> BridgeResult<Vec<String>> {
        let names: Vec<Option<String>> = cells.iter().map(header_name).collect();
        let width = names
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |last| last + 1);

        let mut seen = HashSet::new();
        let mut header = Vec::with_capacity(width);
        for (col_idx, name) in names.into_iter().take(width).enumerate() {
            let Some(name) = name else {
                return Err(BridgeError::Schema(format!(
                    "Sheet '{}': header cell {}1 is blank but a later header cell is not",
                    sheet_name,
                    column_letter(col_idx)
                )));
            };
            if !seen.insert(name.clone()) {
                return Err(BridgeError::Schema(format!(
                    "Sheet '{}': duplicate header '{}' in column {}",
                    sheet_name,
                    name,
                    column_letter(col_idx)
                )));
            }
            header.push(name);
        }

        Ok(header)
    }

    /// Map a calamine cell onto the cell model
    fn convert_cell(&self, cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::Int(i) => CellValue::Integer(*i),
            Data::Float(f) => float_cell(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::DateTime(dt) if dt.is_duration() => float_cell(dt.as_f64()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(datetime) => {
                    CellValue::DateTime(crate::core::dates::round_to_second(datetime))
                }
                None => float_cell(dt.as_f64()),
            },
            Data::DateTimeIso(s) => match self.options.date_patterns.parse(s) {
                Some(datetime) => CellValue::DateTime(datetime),
                None => CellValue::Text(s.clone()),
            },
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }
}

/// Decode workbook bytes with default options
pub fn decode(bytes: &[u8]) -> BridgeResult<DecodeOutput> {
    ExcelImporter::default().decode(bytes)
}

/// Sheet position → row count recorded by the encoder
fn row_extents(names: &[(String, String)]) -> HashMap<usize, usize> {
    names
        .iter()
        .filter_map(|(name, reference)| {
            let index = name.strip_prefix(ROW_EXTENT_NAME)?.parse().ok()?;
            let last_row: usize = reference.rsplit('$').next()?.trim().parse().ok()?;
            Some((index, last_row.min(MAX_ROWS)))
        })
        .collect()
}

fn header_name(cell: &CellValue) -> Option<String> {
    let name = cell_to_display(cell);
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Convert column index to Excel column letter (0→A, 1→B, 25→Z, 26→AA, etc.)
pub fn column_letter(n: usize) -> String {
    let mut result = String::new();
    let mut num = n;

    loop {
        let remainder = num % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if num < 26 {
            break;
        }
        num = num / 26 - 1;
    }

    result
}
