//! Header table detection

use std::collections::HashMap;

use crate::dictionary::{Dictionary, Header};
use crate::source::CellSource;

/// Where each header label was found on a worksheet.
///
/// Schema-level headers sit in the first column, one per row, with their
/// value in the next column. The first row starting with a field-level label
/// is the field header row; each of its cells names a column of the field
/// table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTable {
    rows: HashMap<Header, u32>,
    columns: HashMap<Header, u16>,
    field_row: Option<u32>,
    first_col: u16,
    last_row: u32,
}

impl HeaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run both scans
    pub fn scan<S: CellSource>(source: &S, dictionary: &Dictionary) -> Self {
        let mut table = Self::new();
        if let Some(row) = table.scan_schema_headers(source, dictionary) {
            table.scan_field_headers(source, dictionary, row);
        }
        table
    }

    /// Record schema-level header rows, top down, stopping at the field
    /// header row (returned)
    pub fn scan_schema_headers<S: CellSource>(
        &mut self,
        source: &S,
        dictionary: &Dictionary,
    ) -> Option<u32> {
        let bounds = source.bounds()?;
        self.first_col = bounds.start.col;
        self.last_row = bounds.end.row;

        for row in bounds.start.row..=bounds.end.row {
            let label = source.text(row, bounds.start.col);
            if dictionary.field_header(&label).is_some() {
                return Some(row);
            }
            if let Some(header) = dictionary.schema_header(&label) {
                self.rows.entry(header).or_insert(row);
            }
        }
        None
    }

    /// Map the labels of the field header row to their columns
    pub fn scan_field_headers<S: CellSource>(
        &mut self,
        source: &S,
        dictionary: &Dictionary,
        row: u32,
    ) {
        let Some(bounds) = source.bounds() else {
            return;
        };
        self.field_row = Some(row);

        for col in bounds.start.col..=bounds.end.col {
            if let Some(header) = dictionary.field_header(&source.text(row, col)) {
                self.columns.entry(header).or_insert(col);
            }
        }
    }

    /// First required field header that was not found
    pub fn error_header(&self) -> Option<Header> {
        Header::REQUIRED
            .iter()
            .copied()
            .find(|h| !self.columns.contains_key(h))
    }

    /// Row of a schema-level header
    pub fn row(&self, header: Header) -> Option<u32> {
        self.rows.get(&header).copied()
    }

    /// Column of a field-level header
    pub fn column(&self, header: Header) -> Option<u16> {
        self.columns.get(&header).copied()
    }

    /// Column of a schema-level header's value
    pub fn value_column(&self) -> u16 {
        self.first_col + 1
    }

    pub fn field_row(&self) -> Option<u32> {
        self.field_row
    }

    /// Rows of the field table
    pub fn field_rows(&self) -> impl Iterator<Item = u32> {
        let last_row = self.last_row;
        self.field_row
            .into_iter()
            .flat_map(move |row| row + 1..=last_row)
    }
}
