//! Error types for the compiler

use serde::Serialize;
use sheetschema_core::CellAddress;
use thiserror::Error;

/// Result type for compiler operations
pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Failures raised inside the compiler.
///
/// These never escape a parse: catch boundaries turn them into
/// [`ParseError`] records carrying the worksheet and cell they came from.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A required header label was not found on the worksheet
    #[error("Header \"{0}\" not set")]
    MissingHeader(String),

    /// The field type cell is empty
    #[error("Unknown field type")]
    UnknownFieldType,

    /// An enum field has neither a parameter list nor a list validation
    #[error("Enum values not set")]
    EmptyEnum,

    /// A visibility formula outside the supported grammar
    #[error("Invalid visibility formula: {0}")]
    Condition(String),

    /// A visibility formula refers to a cell with no field
    #[error("Field \"{0}\" not found")]
    FieldNotFound(String),

    /// A reference-typed field matched no schema
    #[error("Sub-schema not found")]
    SubSchemaNotFound,

    /// Grid model error
    #[error(transparent)]
    Core(#[from] sheetschema_core::Error),

    /// Workbook could not be loaded
    #[error("Failed to read workbook: {0}")]
    Xlsx(#[from] sheetschema_xlsx::XlsxError),

    /// JSON (de)serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What a [`ParseError`] is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorTarget {
    /// A field, by name
    Field(String),
    /// The schema built from the worksheet
    Schema,
    /// The visibility condition of a field, by the dependent field's name
    Condition(String),
}

/// A located, reportable error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub worksheet: String,
    /// 1-based row number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u32>,
    /// 1-based column number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col: Option<u32>,
    /// A1 reference of the cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
    #[serde(skip)]
    pub target: Option<ErrorTarget>,
}

impl ParseError {
    /// Create an unlocated error for a worksheet
    pub fn new(worksheet: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: "error".to_string(),
            text: text.into(),
            worksheet: worksheet.into(),
            row: None,
            col: None,
            cell: None,
            target: None,
        }
    }

    /// Locate the error at a zero-based cell position
    pub fn at(mut self, row: u32, col: u16) -> Self {
        let address = CellAddress::new(row, col);
        self.row = Some(row + 1);
        self.col = Some(col as u32 + 1);
        self.cell = Some(address.to_a1_string());
        self
    }

    /// Locate the error on a whole row
    pub fn at_row(mut self, row: u32) -> Self {
        self.row = Some(row + 1);
        self
    }

    pub fn with_target(mut self, target: ErrorTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn from_error(worksheet: impl Into<String>, error: &CompileError) -> Self {
        Self::new(worksheet, error.to_string())
    }
}

/// A value together with the errors produced while building it
#[derive(Debug, Clone, PartialEq)]
pub struct Annotated<T> {
    pub value: T,
    pub errors: Vec<ParseError>,
}

impl<T> Annotated<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(value: T, errors: Vec<ParseError>) -> Self {
        Self { value, errors }
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Annotated<U> {
        Annotated {
            value: f(self.value),
            errors: self.errors,
        }
    }

    pub fn into_parts(self) -> (T, Vec<ParseError>) {
        (self.value, self.errors)
    }
}
