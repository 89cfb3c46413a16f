//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")
//! - [`SheetRange`] - A range optionally qualified by a sheet name (e.g., "'Lists'!$A$1:$A$3")
//! - [`CellData`] - Complete cell data including value and style

mod address;
mod storage;
mod value;

pub use address::{CellAddress, CellRange, SheetRange};
pub use storage::{CellData, CellStorage};
pub use value::{CellError, CellValue};
