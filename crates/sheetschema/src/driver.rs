//! Top-level compiler

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use sheetschema_core::Workbook;
use sheetschema_xlsx::XlsxReader;

use crate::error::{CompileError, CompileResult, ParseError};
use crate::options::CompilerOptions;
use crate::result::{CompileReport, ResultAggregator, ToolRecord};
use crate::sheet::SheetParser;
use crate::source::SheetView;

/// Source of tool identities, consulted for every tool sheet of a workbook
pub trait ToolCatalog {
    fn lookup(&self, message_id: &str) -> Option<ToolRecord>;
}

impl ToolCatalog for HashMap<String, ToolRecord> {
    fn lookup(&self, message_id: &str) -> Option<ToolRecord> {
        self.get(message_id).cloned()
    }
}

/// Read a JSON array of [`ToolRecord`]s, keyed by message id
pub fn tool_catalog_from_reader<R: Read>(reader: R) -> CompileResult<HashMap<String, ToolRecord>> {
    let records: Vec<ToolRecord> = serde_json::from_reader(reader)?;
    Ok(records
        .into_iter()
        .map(|record| (record.message_id.clone(), record))
        .collect())
}

pub fn tool_catalog_from_path<P: AsRef<Path>>(path: P) -> CompileResult<HashMap<String, ToolRecord>> {
    let file = std::fs::File::open(path)?;
    tool_catalog_from_reader(std::io::BufReader::new(file))
}

/// Compiles workbooks into schemas.
///
/// One instance handles one parse at a time; each parse starts from a clean
/// state.
///
/// ```rust
/// use sheetschema::SchemaCompiler;
/// use sheetschema_core::Workbook;
///
/// let mut workbook = Workbook::empty();
/// workbook.add_worksheet_with_name("Sensor").unwrap();
/// let sheet = workbook.worksheet_mut(0).unwrap();
/// for (col, label) in ["Field Type", "Question", "Answer"].iter().enumerate() {
///     sheet.set_cell_value_at(0, col as u16, *label).unwrap();
/// }
/// sheet.set_cell_value("A2", "Number").unwrap();
/// sheet.set_cell_value("B2", "Level").unwrap();
///
/// let mut compiler = SchemaCompiler::new();
/// let report = compiler.parse_workbook(&workbook);
/// assert_eq!(report.schemas.len(), 1);
/// assert_eq!(report.schemas[0].name, "Sensor");
/// ```
pub struct SchemaCompiler {
    options: CompilerOptions,
    tools: Option<Box<dyn ToolCatalog + Send>>,
    result: ResultAggregator,
}

impl Default for SchemaCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCompiler {
    pub fn new() -> Self {
        Self::with_options(CompilerOptions::default())
    }

    pub fn with_options(options: CompilerOptions) -> Self {
        Self {
            options,
            tools: None,
            result: ResultAggregator::new(),
        }
    }

    /// Use a catalog to back-fill tool sheets before references are resolved
    pub fn with_tools(mut self, catalog: impl ToolCatalog + Send + 'static) -> Self {
        self.tools = Some(Box::new(catalog));
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Results of the last parse
    pub fn result(&self) -> &ResultAggregator {
        &self.result
    }

    pub fn clear(&mut self) {
        self.result.clear();
    }

    /// Compile an XLSX package.
    ///
    /// A package that cannot be read yields a report holding only that error.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> CompileReport {
        match XlsxReader::read_bytes(bytes) {
            Ok(workbook) => self.parse_workbook(&workbook),
            Err(err) => self.fail(CompileError::from(err)),
        }
    }

    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> CompileReport {
        match std::fs::read(path) {
            Ok(bytes) => self.parse_bytes(&bytes),
            Err(err) => self.fail(CompileError::from(err)),
        }
    }

    /// Compile every worksheet of a workbook, in tab order
    pub fn parse_workbook(&mut self, workbook: &Workbook) -> CompileReport {
        self.clear();

        for sheet in workbook.worksheets() {
            let span = tracing::info_span!("worksheet", name = %sheet.name());
            let _enter = span.enter();

            let view = SheetView::new(workbook, sheet);
            let parsed = SheetParser::new(&view, &self.options).parse(self.result.links_mut());
            let (schema, errors) = parsed.into_parts();

            match schema {
                Some(schema) if schema.is_tool() => self.result.add_tool(schema),
                Some(schema) => self.result.add_schema(schema),
                None => tracing::warn!("worksheet skipped"),
            }
            self.result.add_errors(errors);
        }

        if let Some(catalog) = &self.tools {
            let ids: Vec<String> = self
                .result
                .tools()
                .iter()
                .filter_map(|t| t.message_id.clone())
                .collect();
            for id in ids {
                match catalog.lookup(&id) {
                    Some(record) => self.result.update_tool(&record),
                    None => tracing::warn!(message_id = %id, "tool not in catalog"),
                }
            }
        }

        self.result.update_schemas();
        tracing::info!(
            schemas = self.result.schemas().len(),
            tools = self.result.tools().len(),
            errors = self.result.errors().count(),
            "workbook compiled"
        );

        self.result.to_report()
    }

    fn fail(&mut self, err: CompileError) -> CompileReport {
        tracing::error!(%err, "workbook not readable");
        self.clear();
        self.result.add_errors([ParseError::from_error("", &err)]);
        self.result.to_report()
    }
}
