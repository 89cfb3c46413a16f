//! Header vocabulary and keyword tables
//!
//! All labels the compiler looks for on a worksheet live here, so a
//! workbook authored in another language only needs a different
//! [`Dictionary`] (the CLI loads one from JSON).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::SchemaEntity;

/// A header the compiler recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Header {
    // schema level: label in the first column, value in the next one
    SchemaName,
    Description,
    SchemaType,
    Tool,
    ToolId,
    // field level: one column of the field table each
    RequiredField,
    FieldType,
    Parameter,
    Visibility,
    Question,
    AllowMultiple,
    Answer,
}

impl Header {
    pub const SCHEMA: [Header; 5] = [
        Header::SchemaName,
        Header::Description,
        Header::SchemaType,
        Header::Tool,
        Header::ToolId,
    ];

    pub const FIELD: [Header; 7] = [
        Header::RequiredField,
        Header::FieldType,
        Header::Parameter,
        Header::Visibility,
        Header::Question,
        Header::AllowMultiple,
        Header::Answer,
    ];

    /// Field headers without which no field can be read
    pub const REQUIRED: [Header; 3] = [Header::FieldType, Header::Question, Header::Answer];

    pub fn is_schema_level(self) -> bool {
        Self::SCHEMA.contains(&self)
    }
}

/// Labels and keywords used to interpret a workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dictionary {
    pub schema_name: String,
    pub description: String,
    pub schema_type: String,
    pub tool: String,
    pub tool_id: String,
    pub required_field: String,
    pub field_type: String,
    pub parameter: String,
    pub visibility: String,
    pub question: String,
    pub allow_multiple: String,
    pub answer: String,
    /// Cell texts read as `true` (case-insensitive)
    pub truthy: Vec<String>,
    /// Schema type label to entity
    pub entities: BTreeMap<String, SchemaEntity>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self {
            schema_name: "Schema".into(),
            description: "Description".into(),
            schema_type: "Schema Type".into(),
            tool: "Tool".into(),
            tool_id: "Tool Id".into(),
            required_field: "Required Field".into(),
            field_type: "Field Type".into(),
            parameter: "Parameter".into(),
            visibility: "Visibility".into(),
            question: "Question".into(),
            allow_multiple: "Allow Multiple Answers".into(),
            answer: "Answer".into(),
            truthy: ["yes", "true", "y", "1"].iter().map(|s| s.to_string()).collect(),
            entities: [
                ("Sub-Schema", SchemaEntity::None),
                ("Verifiable Credentials", SchemaEntity::Vc),
                ("Encrypted Verifiable Credential", SchemaEntity::Evc),
            ]
            .into_iter()
            .map(|(label, entity)| (label.to_string(), entity))
            .collect(),
        }
    }
}

impl Dictionary {
    pub fn label(&self, header: Header) -> &str {
        match header {
            Header::SchemaName => &self.schema_name,
            Header::Description => &self.description,
            Header::SchemaType => &self.schema_type,
            Header::Tool => &self.tool,
            Header::ToolId => &self.tool_id,
            Header::RequiredField => &self.required_field,
            Header::FieldType => &self.field_type,
            Header::Parameter => &self.parameter,
            Header::Visibility => &self.visibility,
            Header::Question => &self.question,
            Header::AllowMultiple => &self.allow_multiple,
            Header::Answer => &self.answer,
        }
    }

    /// Schema-level header whose label is `text`
    pub fn schema_header(&self, text: &str) -> Option<Header> {
        self.find(&Header::SCHEMA, text)
    }

    /// Field-level header whose label is `text`
    pub fn field_header(&self, text: &str) -> Option<Header> {
        self.find(&Header::FIELD, text)
    }

    fn find(&self, headers: &[Header], text: &str) -> Option<Header> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        headers
            .iter()
            .copied()
            .find(|&h| self.label(h).eq_ignore_ascii_case(text))
    }

    pub fn is_truthy(&self, text: &str) -> bool {
        let text = text.trim();
        self.truthy.iter().any(|k| k.eq_ignore_ascii_case(text))
    }

    pub fn entity(&self, text: &str) -> Option<SchemaEntity> {
        let text = text.trim();
        self.entities
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(text))
            .map(|(_, entity)| *entity)
    }
}
