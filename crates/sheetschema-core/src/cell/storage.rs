//! Sparse cell storage
//!
//! Only non-empty cells are kept, in a row-major `BTreeMap` so the compiler
//! can walk a sheet top-down without touching blank rows.

use std::collections::BTreeMap;

use super::CellValue;
use crate::style::{Style, StylePool};

/// Complete data for a single cell
#[derive(Debug, Clone, Default)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Index into the style pool (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create a new cell with a value and default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Check if this cell carries neither a value nor a style
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Row-major sparse storage: `BTreeMap<row, BTreeMap<col, CellData>>`
#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,
    pub(crate) style_pool: StylePool,
}

impl CellStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    fn put(&mut self, row: u32, col: u16, data: CellData) {
        if data.is_empty() {
            if let Some(row_map) = self.rows.get_mut(&row) {
                row_map.remove(&col);
                if row_map.is_empty() {
                    self.rows.remove(&row);
                }
            }
        } else {
            self.rows.entry(row).or_default().insert(col, data);
        }
    }

    /// Set the cell value, keeping its style
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.get(row, col).map(|c| c.style_index).unwrap_or(0);
        self.put(row, col, CellData { value, style_index });
    }

    /// Set the cell style, keeping its value
    pub fn set_style(&mut self, row: u32, col: u16, style: Style) {
        let style_index = self.style_pool.get_or_insert(style);
        let value = self
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default();
        self.put(row, col, CellData { value, style_index });
    }

    /// Resolve the style of a cell (default style when unset)
    pub fn style(&self, row: u32, col: u16) -> &Style {
        self.get(row, col)
            .and_then(|c| self.style_pool.get(c.style_index))
            .unwrap_or_else(|| self.style_pool.default_style())
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bounds of used cells as (min_row, min_col, max_row, max_col)
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let min_row = *self.rows.keys().next()?;
        let max_row = *self.rows.keys().next_back()?;

        let mut min_col = u16::MAX;
        let mut max_col = 0u16;
        for cols in self.rows.values() {
            if let Some(&col) = cols.keys().next() {
                min_col = min_col.min(col);
            }
            if let Some(&col) = cols.keys().next_back() {
                max_col = max_col.max(col);
            }
        }

        Some((min_row, min_col, max_row, max_col))
    }

    /// Iterate over cells in a row, left to right
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cols| cols.iter().map(|(&col, data)| (col, data)))
    }

    /// Iterate over row indices that have data
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }
}
