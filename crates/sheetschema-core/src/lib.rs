//! # sheetschema-core
//!
//! The workbook grid that the schema compiler reads from.
//!
//! This crate provides:
//! - [`CellValue`] - Cell values (numbers, strings, booleans, errors, formulas)
//! - [`CellAddress`], [`CellRange`] and [`SheetRange`] - Cell addressing
//! - [`Style`] - The slice of cell formatting the compiler inspects (font, number format)
//! - [`DataValidation`] and [`Hyperlink`] - Per-cell annotations
//! - [`Workbook`], [`Worksheet`] - The document structures
//!
//! ## Example
//!
//! ```rust
//! use sheetschema_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", "Schema").unwrap();
//! sheet.set_cell_value("B1", "Sensor").unwrap();
//! sheet.set_cell_value_at(1, 0, CellValue::string("Description")).unwrap();
//!
//! assert_eq!(sheet.text_at(0, 1), "Sensor");
//! ```

pub mod cell;
pub mod error;
pub mod hyperlink;
pub mod style;
pub mod validation;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue, SheetRange};
pub use error::{Error, Result};
pub use hyperlink::Hyperlink;
pub use style::{Color, FontStyle, NumberFormat, Style, StylePool};
pub use validation::{DataValidation, ListSource, ValidationType};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
