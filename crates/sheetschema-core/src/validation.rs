//! Data validation
//!
//! Only list validations carry meaning for schema authoring (they enumerate
//! the allowed answers of an enum field); other kinds are kept by name so a
//! loaded sheet does not silently lose them.
//!
//! ## Example
//!
//! ```rust
//! use sheetschema_core::{CellRange, DataValidation, ListSource};
//!
//! let validation = DataValidation::list("\"Low,Medium,High\"")
//!     .with_range(CellRange::parse("G5:G9").unwrap());
//!
//! assert!(validation.applies_to(6, 6));
//! assert_eq!(
//!     validation.list_source().unwrap(),
//!     Some(ListSource::Inline(vec!["Low".into(), "Medium".into(), "High".into()]))
//! );
//! ```

use crate::cell::{CellRange, SheetRange};
use crate::error::{Error, Result};

/// Data validation rule for a set of ranges
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValidation {
    /// Type of validation
    pub validation_type: ValidationType,
    /// Cell ranges this validation applies to
    pub ranges: Vec<CellRange>,
    /// Allow blank/empty cells
    pub allow_blank: bool,
}

/// Kind of validation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValidationType {
    /// Any value
    #[default]
    None,
    /// Dropdown list; `source` is the raw `formula1` text
    List { source: String },
    /// Any other kind (whole, decimal, date, ...), by its XLSX type name
    Other(String),
}

/// Where the entries of a list validation come from
#[derive(Debug, Clone, PartialEq)]
pub enum ListSource {
    /// Literal entries (`"Low,Medium,High"`)
    Inline(Vec<String>),
    /// A range of cells holding the entries
    Reference(SheetRange),
}

impl DataValidation {
    /// Create a list validation from its raw source text.
    ///
    /// `source` is either a quoted comma list (`"Yes,No"`) or a range
    /// reference (`=Lists!$A$1:$A$5`).
    pub fn list(source: impl Into<String>) -> Self {
        Self {
            validation_type: ValidationType::List {
                source: source.into(),
            },
            ranges: Vec::new(),
            allow_blank: true,
        }
    }

    /// Add a cell range this validation applies to
    pub fn with_range(mut self, range: CellRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Check if the validation covers a cell
    pub fn applies_to(&self, row: u32, col: u16) -> bool {
        self.ranges.iter().any(|r| r.contains(row, col))
    }

    /// Interpret the source of a list validation.
    ///
    /// Returns `Ok(None)` for non-list validations and an error when the
    /// source is neither a quoted list nor a readable range.
    pub fn list_source(&self) -> Result<Option<ListSource>> {
        let ValidationType::List { source } = &self.validation_type else {
            return Ok(None);
        };

        let trimmed = source.trim();
        if let Some(inner) = trimmed
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            let entries = inner
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            return Ok(Some(ListSource::Inline(entries)));
        }

        SheetRange::parse(trimmed)
            .map(|r| Some(ListSource::Reference(r)))
            .map_err(|_| Error::InvalidListSource(source.clone()))
    }
}
