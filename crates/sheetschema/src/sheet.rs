//! Worksheet parser
//!
//! Turns one worksheet into a schema (or a tool stub) by walking a fixed
//! sequence of states. Errors are collected along the way; a worksheet only
//! fails outright when its required headers are missing.

use serde::Serialize;
use uuid::Uuid;

use crate::condition::ConditionReader;
use crate::convert::to_entity;
use crate::dictionary::Header;
use crate::error::{Annotated, CompileError, CompileResult, ErrorTarget, ParseError};
use crate::field::FieldReader;
use crate::header::HeaderTable;
use crate::links::LinkCache;
use crate::model::{Condition, Schema, SchemaCategory, SchemaEntity, SchemaField};
use crate::options::CompilerOptions;
use crate::source::CellSource;

/// Parse states, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetState {
    ScanSchemaHeaders,
    ScanFieldHeaders(Option<u32>),
    ValidateHeaders,
    ReadSchemaMetadata,
    Classify,
    ReadFields,
    ReadConditions,
    Finalize,
    Done,
}

/// Parses one worksheet
pub struct SheetParser<'a, S: CellSource> {
    source: &'a S,
    options: &'a CompilerOptions,
}

/// Working set of one parse
struct SheetRun {
    headers: HeaderTable,
    schema: Schema,
    errors: Vec<ParseError>,
    tool: Option<String>,
    tool_id: Option<String>,
}

impl<'a, S: CellSource> SheetParser<'a, S> {
    pub fn new(source: &'a S, options: &'a CompilerOptions) -> Self {
        Self { source, options }
    }

    /// Parse the worksheet.
    ///
    /// Returns no schema, and a single error, when a required header is
    /// missing. Any other failure is recorded against the schema, which is
    /// still returned as far as it got.
    pub fn parse(&self, links: &mut LinkCache) -> Annotated<Option<Schema>> {
        let mut run = SheetRun {
            headers: HeaderTable::new(),
            schema: Schema::new(self.source.name()),
            errors: Vec::new(),
            tool: None,
            tool_id: None,
        };

        let mut state = SheetState::ScanSchemaHeaders;
        while state != SheetState::Done {
            tracing::trace!(?state, "sheet state");
            state = match self.step(state, &mut run, links) {
                Ok(next) => next,
                Err(CompileError::MissingHeader(label)) => {
                    let error = ParseError::from_error(
                        self.source.name(),
                        &CompileError::MissingHeader(label),
                    )
                    .with_target(ErrorTarget::Schema);
                    return Annotated::with_errors(None, vec![error]);
                }
                Err(err) => {
                    run.errors.push(
                        ParseError::from_error(self.source.name(), &err)
                            .with_target(ErrorTarget::Schema),
                    );
                    SheetState::Done
                }
            };
        }

        Annotated::with_errors(Some(run.schema), run.errors)
    }

    fn step(
        &self,
        state: SheetState,
        run: &mut SheetRun,
        links: &mut LinkCache,
    ) -> CompileResult<SheetState> {
        let dictionary = &self.options.dictionary;

        Ok(match state {
            SheetState::ScanSchemaHeaders => {
                let field_row = run.headers.scan_schema_headers(self.source, dictionary);
                SheetState::ScanFieldHeaders(field_row)
            }
            SheetState::ScanFieldHeaders(field_row) => {
                if let Some(row) = field_row {
                    run.headers.scan_field_headers(self.source, dictionary, row);
                }
                SheetState::ValidateHeaders
            }
            SheetState::ValidateHeaders => match run.headers.error_header() {
                Some(header) => {
                    return Err(CompileError::MissingHeader(dictionary.label(header).to_string()))
                }
                None => SheetState::ReadSchemaMetadata,
            },
            SheetState::ReadSchemaMetadata => {
                self.read_metadata(run);
                SheetState::Classify
            }
            SheetState::Classify => {
                if run.tool.is_some() || run.tool_id.is_some() {
                    let schema = &mut run.schema;
                    schema.category = SchemaCategory::Tool;
                    schema.message_id = run.tool_id.take();
                    if let Some(tool) = run.tool.take() {
                        schema.name = tool;
                    }
                    SheetState::Done
                } else {
                    SheetState::ReadFields
                }
            }
            SheetState::ReadFields => {
                let reader = FieldReader::new(self.source, &run.headers, self.options);
                for row in run.headers.field_rows() {
                    if let Some(field) = reader.read(row, links) {
                        let (field, errors) = field.into_parts();
                        run.schema.fields.push(field);
                        run.errors.extend(errors);
                    }
                }
                SheetState::ReadConditions
            }
            SheetState::ReadConditions => {
                let reader = ConditionReader::new(self.source, &run.headers, self.options);
                let schema = &mut run.schema;
                for row in run.headers.field_rows() {
                    if let Some(error) = reader.read(row, &mut schema.fields, &mut schema.conditions) {
                        run.errors.push(error);
                    }
                }
                SheetState::Finalize
            }
            SheetState::Finalize => {
                let uuid = content_id(&run.schema, links)?;
                run.schema.iri = Some(format!("#{}", uuid));
                run.schema.uuid = Some(uuid.to_string());
                tracing::debug!(
                    fields = run.schema.fields.len(),
                    conditions = run.schema.conditions.len(),
                    errors = run.errors.len(),
                    "schema built"
                );
                SheetState::Done
            }
            SheetState::Done => SheetState::Done,
        })
    }

    /// Schema-level values sit next to their header label
    fn read_metadata(&self, run: &mut SheetRun) {
        let dictionary = &self.options.dictionary;
        let col = run.headers.value_column();
        let value = |header: Header| -> Option<String> {
            let row = run.headers.row(header)?;
            let text = self.source.text(row, col);
            (!text.is_empty()).then_some(text)
        };

        if let Some(name) = value(Header::SchemaName) {
            run.schema.name = name;
        }
        run.schema.description = value(Header::Description).unwrap_or_default();
        run.schema.entity = value(Header::SchemaType).and_then(|t| to_entity(&t, dictionary));
        run.tool = value(Header::Tool);
        run.tool_id = value(Header::ToolId);
    }
}

/// Shape a schema's identifier is derived from
#[derive(Serialize)]
struct CanonicalSchema<'a> {
    name: &'a str,
    description: &'a str,
    entity: Option<SchemaEntity>,
    fields: &'a [SchemaField],
    conditions: &'a [Condition],
}

/// UUIDv5 over the canonical JSON of a schema's content.
///
/// Reference fields contribute their type label and target worksheet rather
/// than the `link:N` placeholder, whose number depends on earlier sheets.
pub fn content_id(schema: &Schema, links: &LinkCache) -> CompileResult<Uuid> {
    let fields: Vec<SchemaField> = schema
        .fields
        .iter()
        .map(|field| {
            let mut field = field.clone();
            if let Some(entry) = field.link.and_then(|id| links.get(id)) {
                field.field_type = Some(match &entry.worksheet {
                    Some(worksheet) => format!("{}@{}", entry.name, worksheet),
                    None => entry.name.clone(),
                });
            }
            field
        })
        .collect();
    let canonical = serde_json::to_vec(&CanonicalSchema {
        name: &schema.name,
        description: &schema.description,
        entity: schema.entity,
        fields: &fields,
        conditions: &schema.conditions,
    })?;
    Ok(Uuid::new_v5(&Uuid::NAMESPACE_URL, &canonical))
}
