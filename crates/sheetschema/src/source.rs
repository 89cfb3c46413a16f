//! Cell access used by the compiler

use sheetschema_core::{CellRange, CellValue, FontStyle, NumberFormat, Workbook, Worksheet};

use crate::error::CompileResult;

/// What the compiler needs to know about one worksheet
pub trait CellSource {
    fn name(&self) -> &str;

    /// Bounding range of the populated cells
    fn bounds(&self) -> Option<CellRange>;

    fn value(&self, row: u32, col: u16) -> CellValue;

    /// Cell content as trimmed display text ("" when empty)
    fn text(&self, row: u32, col: u16) -> String {
        self.value(row, col).to_text().trim().to_string()
    }

    /// Formula text including the leading `=`
    fn formula(&self, row: u32, col: u16) -> Option<String>;

    /// Worksheet a cell's hyperlink points at
    fn hyperlink_sheet(&self, row: u32, col: u16) -> Option<String>;

    fn number_format(&self, row: u32, col: u16) -> &NumberFormat;

    fn font(&self, row: u32, col: u16) -> &FontStyle;

    /// Entries of the list validation covering a cell, if any
    fn validation_list(&self, row: u32, col: u16) -> CompileResult<Option<Vec<String>>>;
}

/// A worksheet seen together with its workbook, so list validations can
/// reach ranges on other sheets
#[derive(Clone, Copy)]
pub struct SheetView<'a> {
    workbook: &'a Workbook,
    sheet: &'a Worksheet,
}

impl<'a> SheetView<'a> {
    pub fn new(workbook: &'a Workbook, sheet: &'a Worksheet) -> Self {
        Self { workbook, sheet }
    }
}

impl CellSource for SheetView<'_> {
    fn name(&self) -> &str {
        self.sheet.name()
    }

    fn bounds(&self) -> Option<CellRange> {
        self.sheet.used_range()
    }

    fn value(&self, row: u32, col: u16) -> CellValue {
        self.sheet.get_value_at(row, col)
    }

    fn text(&self, row: u32, col: u16) -> String {
        self.sheet.text_at(row, col)
    }

    fn formula(&self, row: u32, col: u16) -> Option<String> {
        self.sheet.formula_at(row, col).map(str::to_string)
    }

    fn hyperlink_sheet(&self, row: u32, col: u16) -> Option<String> {
        self.sheet.hyperlink_at(row, col)?.sheet_name()
    }

    fn number_format(&self, row: u32, col: u16) -> &NumberFormat {
        &self.sheet.cell_style_at(row, col).number_format
    }

    fn font(&self, row: u32, col: u16) -> &FontStyle {
        &self.sheet.cell_style_at(row, col).font
    }

    fn validation_list(&self, row: u32, col: u16) -> CompileResult<Option<Vec<String>>> {
        match self.sheet.data_validation_at(row, col) {
            Some(validation) => Ok(Some(self.workbook.resolve_list(self.sheet, validation)?)),
            None => Ok(None),
        }
    }
}
