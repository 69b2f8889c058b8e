//! Schema inference: reduce a column's values to its narrowest common type

use crate::types::{CellValue, ColumnSchema, ColumnType, SheetSchema};

/// Folds cell tags into a column type.
///
/// Observation order does not matter: widening is associative and
/// commutative. A result is only produced by [`TypeAccumulator::finish`],
/// after every value of the column was observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeAccumulator {
    widened: Option<ColumnType>,
    saw_empty: bool,
    observed: usize,
}

impl TypeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, cell: &CellValue) {
        self.observed += 1;
        match cell.column_type() {
            None => self.saw_empty = true,
            Some(tag) => {
                self.widened = Some(match self.widened {
                    None => tag,
                    Some(current) => current.widen(tag),
                });
            }
        }
    }

    /// Number of cells observed so far, empty ones included
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Close the column. No non-empty value at all means string, nullable.
    pub fn finish(self, name: impl Into<String>) -> ColumnSchema {
        match self.widened {
            Some(column_type) => ColumnSchema::new(name, column_type, self.saw_empty),
            None => ColumnSchema::new(name, ColumnType::String, true),
        }
    }
}

/// Infer one column's schema from all of its data cells (header excluded)
pub fn infer_column<'a, I>(name: impl Into<String>, cells: I) -> ColumnSchema
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut acc = TypeAccumulator::new();
    for cell in cells {
        acc.observe(cell);
    }
    acc.finish(name)
}

/// Infer a sheet's schema from its header and column-major cell values.
///
/// `columns[i]` holds every data cell of `header[i]`.
pub fn infer_sheet(header: &[String], columns: &[Vec<CellValue>]) -> SheetSchema {
    let schemas = header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = columns.get(idx).map(|c| c.as_slice()).unwrap_or(&[]);
            infer_column(name.clone(), cells)
        })
        .collect();
    SheetSchema::new(schemas)
}
