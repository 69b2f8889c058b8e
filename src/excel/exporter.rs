//! Excel exporter implementation - Document → workbook bytes

use super::ROW_EXTENT_NAME;
use crate::core::dates::is_date_only;
use crate::core::layout::{resolve_layout, SheetLayout};
use crate::core::ConvertOptions;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{CellValue, Document, FormatSpec};
use chrono::{Datelike, NaiveDateTime, Timelike};
use rayon::prelude::*;
use rust_xlsxwriter::utility::{cell_range_absolute, quote_sheet_name};
use rust_xlsxwriter::{ExcelDateTime, Format, Formula, Workbook, Worksheet, XlsxError};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Rows per worksheet in the binary format
pub const MAX_ROWS: usize = 1_048_576;
/// Columns per worksheet in the binary format
pub const MAX_COLUMNS: usize = 16_384;
/// Characters in a worksheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Number formats that mark a numeric cell as a date
struct DateFormats {
    date: Format,
    datetime: Format,
}

impl DateFormats {
    fn new() -> Self {
        Self {
            date: Format::new().set_num_format("yyyy-mm-dd"),
            datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
        }
    }
}

/// Excel exporter: lays out each Document sheet and writes an .xlsx workbook
pub struct ExcelExporter {
    options: ConvertOptions,
}

impl Default for ExcelExporter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl ExcelExporter {
    /// Create a new Excel exporter
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Encode a Document into .xlsx bytes
    pub fn encode(&self, document: &Document, format: Option<&FormatSpec>) -> BridgeResult<Vec<u8>> {
        if document.is_empty() {
            return Err(BridgeError::Validation("no sheet data to encode".to_string()));
        }

        let layouts = self.layout(document, format)?;
        let emitted: Vec<&SheetLayout> = layouts.iter().filter(|l| l.is_emittable()).collect();
        if emitted.is_empty() {
            return Err(BridgeError::Validation("no sheet data to encode".to_string()));
        }
        check_sheet_names(emitted.iter().map(|l| l.name.as_str()))?;

        let mut workbook = Workbook::new();
        let formats = DateFormats::new();
        for (index, layout) in emitted.into_iter().enumerate() {
            self.write_layout(&mut workbook, layout, &formats)?;
            if ends_with_blank_row(layout) {
                mark_row_extent(&mut workbook, index, layout)?;
            }
        }

        workbook
            .save_to_buffer()
            .map_err(|e| BridgeError::Internal(format!("Failed to serialize workbook: {}", e)))
    }

    /// Encode a Document and write the workbook to `output_path`
    pub fn encode_to_file(
        &self,
        document: &Document,
        format: Option<&FormatSpec>,
        output_path: &Path,
    ) -> BridgeResult<()> {
        let bytes = self.encode(document, format)?;
        std::fs::write(output_path, bytes)?;
        Ok(())
    }

    /// Resolve the layout of every Document sheet, in Document order.
    ///
    /// Sheets named only by the Format Specification are ignored.
    pub fn layout(
        &self,
        document: &Document,
        format: Option<&FormatSpec>,
    ) -> BridgeResult<Vec<SheetLayout>> {
        if let Some(spec) = format {
            for name in spec.sheets.keys() {
                if document.sheet(name).is_none() {
                    debug!(sheet = %name, "format specification names an absent sheet; ignored");
                }
            }
        }

        let patterns = &self.options.date_patterns;
        let resolve = |(name, records): &(String, Vec<crate::types::Record>)| {
            let explicit = format.and_then(|spec| spec.columns_for(name));
            resolve_layout(name, records, explicit, patterns)
        };

        let layouts: Vec<BridgeResult<SheetLayout>> =
            if self.options.parallel && document.sheets.len() > 1 {
                document.sheets.par_iter().map(resolve).collect()
            } else {
                document.sheets.iter().map(resolve).collect()
            };
        layouts.into_iter().collect()
    }

    /// Write one resolved sheet: header row, then one row per record
    fn write_layout(
        &self,
        workbook: &mut Workbook,
        layout: &SheetLayout,
        formats: &DateFormats,
    ) -> BridgeResult<()> {
        if layout.columns.len() > MAX_COLUMNS {
            return Err(BridgeError::Validation(format!(
                "Sheet '{}' has {} columns; the limit is {}",
                layout.name,
                layout.columns.len(),
                MAX_COLUMNS
            )));
        }
        if layout.rows.len() + 1 > MAX_ROWS {
            return Err(BridgeError::Validation(format!(
                "Sheet '{}' has {} records; the limit is {}",
                layout.name,
                layout.rows.len(),
                MAX_ROWS - 1
            )));
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&layout.name).map_err(|e| {
            BridgeError::Validation(format!("Invalid sheet name '{}': {}", layout.name, e))
        })?;

        // empty-string formulas cache "" rather than 0
        worksheet.set_formula_result_default("");

        // Write header row (row 0)
        for (col_idx, column) in layout.columns.iter().enumerate() {
            worksheet
                .write_string(0, col_idx as u16, column)
                .map_err(|e| cell_error(&layout.name, 0, column, e))?;
        }

        // Write data rows (starting at row 1)
        for (row_idx, row) in layout.rows.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                write_cell(worksheet, excel_row, col_idx as u16, cell, formats)
                    .map_err(|e| cell_error(&layout.name, excel_row, &layout.columns[col_idx], e))?;
            }
        }

        debug!(
            sheet = %layout.name,
            columns = layout.columns.len(),
            rows = layout.rows.len(),
            "wrote sheet"
        );
        Ok(())
    }
}

/// Encode a Document with default options
pub fn encode(document: &Document, format: Option<&FormatSpec>) -> BridgeResult<Vec<u8>> {
    ExcelExporter::default().encode(document, format)
}

/// Trailing records with no value leave no cell behind, so readers stop
/// the sheet before them
fn ends_with_blank_row(layout: &SheetLayout) -> bool {
    layout
        .rows
        .last()
        .is_some_and(|row| row.iter().all(CellValue::is_empty))
}

/// Record the sheet's full extent, header included, as a defined name
fn mark_row_extent(workbook: &mut Workbook, index: usize, layout: &SheetLayout) -> BridgeResult<()> {
    let last_col = layout.columns.len().saturating_sub(1) as u16;
    let range = cell_range_absolute(0, 0, layout.rows.len() as u32, last_col);
    let reference = format!("={}!{}", quote_sheet_name(&layout.name), range);
    workbook
        .define_name(format!("{}{}", ROW_EXTENT_NAME, index), &reference)
        .map_err(|e| {
            BridgeError::Internal(format!(
                "Failed to record the extent of sheet '{}': {}",
                layout.name, e
            ))
        })?;
    debug!(sheet = %layout.name, reference = %reference, "recorded row extent");
    Ok(())
}

/// Write a single cell according to its tag. Empty cells are left unwritten.
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    formats: &DateFormats,
) -> Result<(), XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Boolean(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Integer(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        // an empty string cell is dropped by the writer
        CellValue::Text(s) if s.is_empty() => {
            worksheet.write_formula(row, col, Formula::new("=\"\""))?;
        }
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::DateTime(dt) => match excel_datetime(dt) {
            Some(excel_dt) => {
                let format = if is_date_only(dt) {
                    &formats.date
                } else {
                    &formats.datetime
                };
                worksheet.write_datetime_with_format(row, col, &excel_dt, format)?;
            }
            // outside the 1900-9999 range Excel dates can express
            None => {
                worksheet.write_string(row, col, crate::core::dates::format_iso(dt))?;
            }
        },
    }
    Ok(())
}

fn excel_datetime(dt: &NaiveDateTime) -> Option<ExcelDateTime> {
    let year = u16::try_from(dt.year()).ok()?;
    ExcelDateTime::from_ymd(year, dt.month() as u8, dt.day() as u8)
        .and_then(|date| date.and_hms(dt.hour() as u16, dt.minute() as u8, dt.second()))
        .ok()
}

fn cell_error(sheet: &str, row: u32, column: &str, err: XlsxError) -> BridgeError {
    BridgeError::Validation(format!(
        "Sheet '{}' row {} column '{}': {}",
        sheet,
        row + 1,
        column,
        err
    ))
}

/// Reject sheet names the binary format cannot store.
///
/// Names are compared case-insensitively, as spreadsheet applications do.
pub fn check_sheet_names<'a, I>(names: I) -> BridgeResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(BridgeError::Validation(
                "Sheet names must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(BridgeError::Validation(format!(
                "Sheet name '{}' is longer than {} characters",
                name, MAX_SHEET_NAME_LEN
            )));
        }
        if let Some(c) = name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
            return Err(BridgeError::Validation(format!(
                "Sheet name '{}' contains the invalid character '{}'",
                name, c
            )));
        }
        if name.starts_with('\'') || name.ends_with('\'') {
            return Err(BridgeError::Validation(format!(
                "Sheet name '{}' must not start or end with an apostrophe",
                name
            )));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(BridgeError::Validation(format!(
                "Sheet name '{}' is used more than once (names are case-insensitive)",
                name
            )));
        }
    }
    Ok(())
}
