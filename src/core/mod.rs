//! Conversion core: type model coercions, schema inference, layout resolution

pub mod coercion;
pub mod dates;
pub mod inference;
pub mod layout;

pub use coercion::{canonical_json, cell_to_json, json_to_cell};
pub use dates::DatePatterns;
pub use inference::{infer_column, infer_sheet, TypeAccumulator};
pub use layout::{resolve_columns, resolve_layout, SheetLayout};

/// Conversion settings shared by the decoder and the encoder
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Patterns that turn strings into Date/Time cells on encode
    pub date_patterns: DatePatterns,
    /// Decode/lay out independent sheets on the rayon pool
    pub parallel: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            date_patterns: DatePatterns::default(),
            parallel: true,
        }
    }
}

impl ConvertOptions {
    pub fn with_date_patterns(mut self, date_patterns: DatePatterns) -> Self {
        self.date_patterns = date_patterns;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
