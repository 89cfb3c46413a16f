//! End-to-end tests for sheetschema-xlsx.
//!
//! Each test assembles the exact package it needs in memory with
//! [`XlsxFixture`], then reads it back with `XlsxReader` and asserts on the
//! resulting workbook.

mod common;
mod reading;

pub use common::*;
