//! # sheetschema-xlsx
//!
//! Reads XLSX (Office Open XML) workbooks into the `sheetschema-core` model.
//!
//! Only what schema authoring relies on is loaded: cell values, formula text
//! with cached results, number formats, fonts, list validations and
//! hyperlinks.

pub mod error;
pub mod reader;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
