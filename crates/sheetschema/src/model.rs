//! Schema model produced by the compiler

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field_type::FieldTypeKind;
use crate::links::LinkId;

/// Status given to every freshly compiled schema
pub const DRAFT_STATUS: &str = "DRAFT";

/// What a schema describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaEntity {
    /// Plain sub-schema, no credential
    None,
    /// Verifiable credential
    Vc,
    /// Encrypted verifiable credential
    Evc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaCategory {
    #[default]
    Policy,
    Tool,
}

/// Display styling of a help-text field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FontDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub bold: bool,
}

/// One field of a schema, read from a table row
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    /// Path of the answer cell ("G5")
    pub name: String,
    pub description: String,
    pub required: bool,
    pub is_array: bool,
    pub read_only: bool,
    pub hidden: bool,
    /// Primitive type, `#`-prefixed schema IRI, or None when unknown
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub is_ref: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_type: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Value>>,

    /// Registry entry the type label matched
    #[serde(skip)]
    pub kind: Option<FieldTypeKind>,
    /// Placeholder of a reference-typed field, kept so resolution can be re-run
    #[serde(skip)]
    pub link: Option<LinkId>,
    /// Zero-based worksheet row
    #[serde(skip)]
    pub row: u32,
}

/// A field shown only when another field's answer matches a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionTarget {
    pub field: String,
    pub invert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Driving field name
    pub field: String,
    /// Answer the driving field is compared with
    pub value: String,
    pub targets: Vec<ConditionTarget>,
}

impl Condition {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            targets: Vec::new(),
        }
    }

    /// Conditions are the same rule when driving field and value agree
    pub fn same_rule(&self, field: &str, value: &str) -> bool {
        self.field == field && self.value == value
    }

    pub fn add_target(&mut self, field: impl Into<String>, invert: bool) {
        self.targets.push(ConditionTarget {
            field: field.into(),
            invert,
        });
    }
}

/// A compiled schema, or the identity stub of a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub uuid: Option<String>,
    pub iri: Option<String>,
    pub name: String,
    pub description: String,
    pub entity: Option<SchemaEntity>,
    pub category: SchemaCategory,
    pub fields: Vec<SchemaField>,
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub version: Option<String>,
    pub status: String,
    pub worksheet: String,
}

impl Schema {
    pub fn new(worksheet: impl Into<String>) -> Self {
        let worksheet = worksheet.into();
        Self {
            uuid: None,
            iri: None,
            name: worksheet.clone(),
            description: String::new(),
            entity: None,
            category: SchemaCategory::Policy,
            fields: Vec::new(),
            conditions: Vec::new(),
            message_id: None,
            version: None,
            status: DRAFT_STATUS.to_string(),
            worksheet,
        }
    }

    pub fn is_tool(&self) -> bool {
        self.category == SchemaCategory::Tool
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut SchemaField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Find the condition for `(field, value)`
    pub fn condition_mut(&mut self, field: &str, value: &str) -> Option<&mut Condition> {
        self.conditions.iter_mut().find(|c| c.same_rule(field, value))
    }
}
