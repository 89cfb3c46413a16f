//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::hyperlink::Hyperlink;
use crate::style::Style;
use crate::validation::DataValidation;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    hyperlinks: BTreeMap<(u32, u16), Hyperlink>,
    data_validations: Vec<DataValidation>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            hyperlinks: BTreeMap::new(),
            data_validations: Vec::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Cell Access ===

    /// Get cell value by address string (e.g., "A1")
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Displayed text of a cell, trimmed (empty string for an empty cell)
    pub fn text_at(&self, row: u32, col: u16) -> String {
        self.cells
            .get(row, col)
            .map(|c| c.value.to_text().trim().to_string())
            .unwrap_or_default()
    }

    /// Formula text at a cell (if it holds a formula)
    pub fn formula_at(&self, row: u32, col: u16) -> Option<&str> {
        self.cells.get(row, col).and_then(|c| c.value.formula_text())
    }

    /// Style applied to a cell (the default style when none is set)
    pub fn cell_style_at(&self, row: u32, col: u16) -> &Style {
        self.cells.style(row, col)
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set a cell formula by address string
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_formula_at(addr.row, addr.col, formula)
    }

    /// Set a cell formula by row and column indices; a leading `=` is added if missing
    pub fn set_cell_formula_at(&mut self, row: u32, col: u16, formula: &str) -> Result<()> {
        self.validate_cell_position(row, col)?;

        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };

        self.cells.set_value(row, col, CellValue::formula(formula));
        Ok(())
    }

    /// Store the cached result of a formula cell
    pub fn set_formula_result(&mut self, row: u32, col: u16, value: CellValue) -> Result<()> {
        match self.get_value_at(row, col) {
            CellValue::Formula { text, .. } => {
                self.cells.set_value(
                    row,
                    col,
                    CellValue::Formula {
                        text,
                        cached_value: Some(Box::new(value)),
                    },
                );
                Ok(())
            }
            _ => Err(Error::InvalidAddress(format!(
                "{} is not a formula cell",
                CellAddress::new(row, col)
            ))),
        }
    }

    /// Set a cell style by address string
    pub fn set_cell_style(&mut self, address: &str, style: &Style) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    /// Set a cell style by row and column indices
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_style(row, col, style.clone());
        Ok(())
    }

    // === Range Operations ===

    /// Get the used range (bounds of all non-empty cells)
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::from_indices(min_row, min_col, max_row, max_col)
            })
    }

    /// Iterate over the populated cells of a row, left to right
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }

    /// Row indices that hold at least one cell, top to bottom
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.row_indices()
    }

    /// Get the number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Check if the worksheet is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // === Hyperlinks ===

    /// Attach a hyperlink to a cell
    pub fn set_hyperlink_at(&mut self, row: u32, col: u16, link: Hyperlink) {
        self.hyperlinks.insert((row, col), link);
    }

    /// Attach a hyperlink to a cell by address string
    pub fn set_hyperlink(&mut self, address: &str, link: Hyperlink) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_hyperlink_at(addr.row, addr.col, link);
        Ok(())
    }

    /// Get the hyperlink attached to a cell
    pub fn hyperlink_at(&self, row: u32, col: u16) -> Option<&Hyperlink> {
        self.hyperlinks.get(&(row, col))
    }

    /// Number of cells carrying a hyperlink
    pub fn hyperlink_count(&self) -> usize {
        self.hyperlinks.len()
    }

    // === Data Validation ===

    /// Add a data validation rule
    pub fn add_data_validation(&mut self, validation: DataValidation) {
        self.data_validations.push(validation);
    }

    /// All data validation rules
    pub fn data_validations(&self) -> &[DataValidation] {
        &self.data_validations
    }

    /// The first validation rule covering a cell
    pub fn data_validation_at(&self, row: u32, col: u16) -> Option<&DataValidation> {
        self.data_validations
            .iter()
            .find(|v| v.applies_to(row, col))
    }

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}
