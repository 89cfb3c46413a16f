//! Field type registry
//!
//! Maps the type labels authors write in the Field Type column onto JSON
//! schema type metadata. Labels not found here are treated as references to
//! other schemas.

use serde::{Deserialize, Serialize};

use crate::convert::UnitPosition;

/// The closed set of field types the compiler understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldTypeKind {
    Number,
    Integer,
    String,
    Boolean,
    Date,
    Time,
    DateTime,
    Duration,
    Url,
    Uri,
    Email,
    Image,
    Account,
    Prefix,
    Postfix,
    Enum,
    HelpText,
    GeoJson,
    SentinelHub,
    AutoCalculate,
}

/// Which parameter rule a field type follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRule {
    /// Unit from the answer cell's number format, or the parameter cell
    Unit(UnitPosition),
    /// Values from the answer cell's list validation, or the parameter cell
    EnumValues,
    /// Font from the question cell's styling, or the parameter cell
    Font,
    None,
}

impl FieldTypeKind {
    pub fn parameter_rule(self) -> ParameterRule {
        match self {
            FieldTypeKind::Prefix => ParameterRule::Unit(UnitPosition::Prefix),
            FieldTypeKind::Postfix => ParameterRule::Unit(UnitPosition::Postfix),
            FieldTypeKind::Enum => ParameterRule::EnumValues,
            FieldTypeKind::HelpText => ParameterRule::Font,
            _ => ParameterRule::None,
        }
    }

    /// Whether the answer cell holds an example value
    pub fn records_example(self) -> bool {
        !matches!(self, FieldTypeKind::AutoCalculate)
    }

    /// Display-only and computed fields cannot be answered
    pub fn is_read_only(self) -> bool {
        matches!(self, FieldTypeKind::HelpText | FieldTypeKind::AutoCalculate)
    }
}

/// Type metadata copied onto every field using a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeEntry {
    pub kind: FieldTypeKind,
    /// Label as written in the Field Type column
    pub label: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_ref: bool,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub unit_system: Option<String>,
    #[serde(default)]
    pub custom_type: Option<String>,
}

impl FieldTypeEntry {
    pub fn new(kind: FieldTypeKind, label: &str, type_name: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            type_name: type_name.to_string(),
            is_ref: false,
            format: None,
            pattern: None,
            unit: None,
            unit_system: None,
            custom_type: None,
        }
    }

    fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    fn unit_system(mut self, unit_system: &str) -> Self {
        self.unit_system = Some(unit_system.to_string());
        self
    }

    fn custom_type(mut self, custom_type: &str) -> Self {
        self.custom_type = Some(custom_type.to_string());
        self
    }

    fn reference(mut self) -> Self {
        self.is_ref = true;
        self
    }
}

/// Lookup table from type label to [`FieldTypeEntry`]
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTypeRegistry {
    entries: Vec<FieldTypeEntry>,
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        use FieldTypeKind as K;

        Self {
            entries: vec![
                FieldTypeEntry::new(K::Number, "Number", "number"),
                FieldTypeEntry::new(K::Integer, "Integer", "integer"),
                FieldTypeEntry::new(K::String, "String", "string"),
                FieldTypeEntry::new(K::Boolean, "Boolean", "boolean"),
                FieldTypeEntry::new(K::Date, "Date", "string").format("date"),
                FieldTypeEntry::new(K::Time, "Time", "string").format("time"),
                FieldTypeEntry::new(K::DateTime, "DateTime", "string").format("date-time"),
                FieldTypeEntry::new(K::Duration, "Duration", "string").format("duration"),
                FieldTypeEntry::new(K::Url, "URL", "string").format("url"),
                FieldTypeEntry::new(K::Uri, "URI", "string").format("uri"),
                FieldTypeEntry::new(K::Email, "Email", "string").format("email"),
                FieldTypeEntry::new(K::Image, "Image", "string").pattern("^ipfs://.+"),
                FieldTypeEntry::new(K::Account, "Account", "string")
                    .pattern("^\\d+\\.\\d+\\.\\d+$")
                    .custom_type("hederaAccount"),
                FieldTypeEntry::new(K::Prefix, "Prefix", "number").unit_system("prefix"),
                FieldTypeEntry::new(K::Postfix, "Postfix", "number").unit_system("postfix"),
                FieldTypeEntry::new(K::Enum, "Enum", "string"),
                FieldTypeEntry::new(K::HelpText, "Help Text", "null"),
                FieldTypeEntry::new(K::GeoJson, "GeoJSON", "#GeoJSON")
                    .custom_type("geo")
                    .reference(),
                FieldTypeEntry::new(K::SentinelHub, "SentinelHUB", "#SentinelHUB")
                    .custom_type("sentinel")
                    .reference(),
                FieldTypeEntry::new(K::AutoCalculate, "Auto-Calculate", "number"),
            ],
        }
    }
}

impl FieldTypeRegistry {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Entry for a type label (trimmed, case-insensitive)
    pub fn get(&self, label: &str) -> Option<&FieldTypeEntry> {
        let label = label.trim();
        self.entries
            .iter()
            .find(|e| e.label.eq_ignore_ascii_case(label))
    }

    pub fn get_kind(&self, kind: FieldTypeKind) -> Option<&FieldTypeEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// Add an entry, replacing any entry with the same label
    pub fn register(&mut self, entry: FieldTypeEntry) {
        self.entries
            .retain(|e| !e.label.eq_ignore_ascii_case(&entry.label));
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[FieldTypeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
