//! # sheetschema
//!
//! Compiles schema-authoring workbooks into structured schemas.
//!
//! Each worksheet describes one schema: a few schema-level rows (name,
//! description, type, or a tool reference) followed by a field table whose
//! rows become fields. Field types not known to the [`FieldTypeRegistry`]
//! are references to other worksheets or tool schemas and are resolved once
//! every worksheet has been read. Visibility cells become [`Condition`]s.
//!
//! Problems are reported, never raised: a compile always produces a
//! [`CompileReport`] listing what was built and every error found, located
//! by worksheet and cell.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheetschema::SchemaCompiler;
//!
//! let bytes = std::fs::read("policy.xlsx").unwrap();
//! let report = SchemaCompiler::new().parse_bytes(&bytes);
//! for error in &report.errors {
//!     eprintln!("{}: {}", error.worksheet, error.text);
//! }
//! ```

pub mod condition;
pub mod convert;
pub mod dictionary;
pub mod driver;
pub mod error;
pub mod field;
pub mod field_type;
pub mod header;
pub mod links;
pub mod model;
pub mod options;
pub mod result;
pub mod sheet;
pub mod source;

pub use condition::{parse_visibility, ConditionReader, VisibilityRule};
pub use dictionary::{Dictionary, Header};
pub use driver::{tool_catalog_from_path, tool_catalog_from_reader, SchemaCompiler, ToolCatalog};
pub use error::{Annotated, CompileError, CompileResult, ErrorTarget, ParseError};
pub use field::FieldReader;
pub use field_type::{FieldTypeEntry, FieldTypeKind, FieldTypeRegistry};
pub use header::HeaderTable;
pub use links::{LinkCache, LinkEntry, LinkId, ReferenceCache, ReferenceEntry};
pub use model::{
    Condition, ConditionTarget, FontDescriptor, Schema, SchemaCategory, SchemaEntity, SchemaField,
};
pub use options::CompilerOptions;
pub use result::{
    CompileReport, ResultAggregator, SchemaSummary, ToolRecord, ToolSchema, ToolSummary,
};
pub use sheet::SheetParser;
pub use source::{CellSource, SheetView};
