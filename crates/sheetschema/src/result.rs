//! Result aggregation and cross-sheet resolution

use serde::{Deserialize, Serialize};
use sheetschema_core::CellAddress;

use crate::error::{CompileError, ErrorTarget, ParseError};
use crate::links::{LinkCache, LinkEntry, ReferenceCache, ReferenceEntry};
use crate::model::{Schema, SchemaField};

/// A tool's published identity, as known to the tool registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRecord {
    pub message_id: String,
    pub uuid: String,
    pub name: String,
    /// Schemas of the tool; the first one is its root
    #[serde(default)]
    pub schemas: Vec<ToolSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub iri: String,
    pub name: String,
}

/// Summary of a compiled schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSummary {
    pub id: Option<String>,
    pub iri: Option<String>,
    pub name: String,
    pub description: String,
    pub version: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSummary {
    pub uuid: Option<String>,
    pub name: String,
    pub message_id: Option<String>,
}

/// Output document of a compile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileReport {
    pub schemas: Vec<SchemaSummary>,
    pub tools: Vec<ToolSummary>,
    pub errors: Vec<ParseError>,
}

impl CompileReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Everything collected over one compile
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    schemas: Vec<Schema>,
    tools: Vec<Schema>,
    links: LinkCache,
    references: ReferenceCache,
    errors: Vec<ParseError>,
    resolution_errors: Vec<ParseError>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its worksheet and its name
    pub fn add_schema(&mut self, schema: Schema) {
        let entry = ReferenceEntry::schema(schema.iri.clone());
        self.references.insert_worksheet(&schema.worksheet, entry.clone());
        self.references.insert_name(&schema.name, entry);
        self.schemas.push(schema);
    }

    /// Register a tool stub under its worksheet and its name
    pub fn add_tool(&mut self, tool: Schema) {
        let Some(message_id) = tool.message_id.clone() else {
            // a sheet naming a tool without its id can only be found by name
            self.references
                .insert_name(&tool.name, ReferenceEntry::default());
            self.tools.push(tool);
            return;
        };
        self.references
            .insert_worksheet(&tool.worksheet, ReferenceEntry::tool(&message_id));
        self.references
            .insert_name(&tool.name, ReferenceEntry::tool(&message_id));
        self.tools.push(tool);
    }

    pub fn add_errors(&mut self, errors: impl IntoIterator<Item = ParseError>) {
        self.errors.extend(errors);
    }

    /// Back-fill a tool stub once the tool's schemas are known.
    ///
    /// References to the tool resolve to its root schema; each tool schema
    /// also becomes reachable as `"<schema> (<tool>)"`.
    pub fn update_tool(&mut self, record: &ToolRecord) {
        let mut found = false;
        for tool in self
            .tools
            .iter_mut()
            .filter(|t| t.message_id.as_deref() == Some(record.message_id.as_str()))
        {
            tool.uuid = Some(record.uuid.clone());
            tool.name = record.name.clone();
            found = true;
        }
        if !found {
            tracing::debug!(message_id = %record.message_id, "no sheet uses this tool");
        }

        if let Some(root) = record.schemas.first() {
            for entry in self.references.entries_mut() {
                if entry.tool.as_deref() == Some(record.message_id.as_str()) {
                    entry.iri = Some(root.iri.clone());
                }
            }
        }

        for schema in &record.schemas {
            self.references.replace_name(
                qualified_name(&schema.name, &record.name),
                ReferenceEntry {
                    iri: Some(schema.iri.clone()),
                    tool: Some(record.message_id.clone()),
                },
            );
        }
    }

    /// Resolve every reference-typed field to a schema IRI.
    ///
    /// Lookup order: the linked worksheet, then the plain name, then the name
    /// qualified by each tool in registration order. Unresolved fields lose
    /// their type and get a "Sub-schema not found" error. Running this again
    /// recomputes all resolutions and replaces the previous errors.
    pub fn update_schemas(&mut self) {
        self.resolution_errors.clear();

        let tool_names: Vec<String> = self.tools.iter().map(|t| t.name.clone()).collect();
        for schema in &mut self.schemas {
            for field in &mut schema.fields {
                let Some(link) = field.link else {
                    continue;
                };

                let iri = self
                    .links
                    .get(link)
                    .and_then(|entry| lookup(&self.references, entry, &tool_names))
                    .and_then(|entry| entry.iri.clone());

                match iri {
                    Some(iri) => field.field_type = Some(iri),
                    None => {
                        field.field_type = None;
                        self.resolution_errors
                            .push(field_error(&schema.worksheet, field, &CompileError::SubSchemaNotFound));
                    }
                }
            }
        }
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn tools(&self) -> &[Schema] {
        &self.tools
    }

    pub fn links(&self) -> &LinkCache {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut LinkCache {
        &mut self.links
    }

    pub fn references(&self) -> &ReferenceCache {
        &self.references
    }

    /// Parse errors followed by resolution errors
    pub fn errors(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter().chain(self.resolution_errors.iter())
    }

    /// Errors attached to a field, schema or condition of a worksheet
    pub fn errors_for(&self, worksheet: &str, target: &ErrorTarget) -> Vec<&ParseError> {
        self.errors()
            .filter(|e| e.worksheet == worksheet && e.target.as_ref() == Some(target))
            .collect()
    }

    pub fn clear(&mut self) {
        self.schemas.clear();
        self.tools.clear();
        self.links.clear();
        self.references.clear();
        self.errors.clear();
        self.resolution_errors.clear();
    }

    pub fn to_report(&self) -> CompileReport {
        CompileReport {
            schemas: self
                .schemas
                .iter()
                .map(|s| SchemaSummary {
                    id: s.uuid.clone(),
                    iri: s.iri.clone(),
                    name: s.name.clone(),
                    description: s.description.clone(),
                    version: s.version.clone(),
                    status: s.status.clone(),
                })
                .collect(),
            tools: self
                .tools
                .iter()
                .map(|t| ToolSummary {
                    uuid: t.uuid.clone(),
                    name: t.name.clone(),
                    message_id: t.message_id.clone(),
                })
                .collect(),
            errors: self.errors().cloned().collect(),
        }
    }
}

/// `"<schema> (<tool>)"`
pub fn qualified_name(schema: &str, tool: &str) -> String {
    format!("{} ({})", schema, tool)
}

fn lookup<'r>(
    references: &'r ReferenceCache,
    link: &LinkEntry,
    tool_names: &[String],
) -> Option<&'r ReferenceEntry> {
    if let Some(entry) = link
        .worksheet
        .as_deref()
        .and_then(|ws| references.by_worksheet(ws))
    {
        return Some(entry);
    }
    if let Some(entry) = references.by_name(&link.name) {
        return Some(entry);
    }
    tool_names
        .iter()
        .find_map(|tool| references.by_name(&qualified_name(&link.name, tool)))
}

fn field_error(worksheet: &str, field: &SchemaField, err: &CompileError) -> ParseError {
    let error = ParseError::from_error(worksheet, err);
    let error = match CellAddress::parse(&field.name) {
        Ok(address) => error.at(address.row, address.col),
        Err(_) => error.at_row(field.row),
    };
    error.with_target(ErrorTarget::Field(field.name.clone()))
}
