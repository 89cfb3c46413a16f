//! Link and reference caches
//!
//! A [`LinkCache`] remembers every type label that named another schema
//! instead of a registered type. The [`ReferenceCache`] knows where each
//! compiled schema and tool can be found, keyed both by worksheet and by
//! display name. Resolution joins the two once all sheets are read.

use std::collections::HashMap;
use std::fmt;

/// Placeholder id handed out for a reference-typed field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(u32);

impl LinkId {
    pub fn index(self) -> u32 {
        self.0
    }

    /// Type string a field carries until its reference is resolved
    pub fn placeholder(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link:{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub id: LinkId,
    /// Type label as written
    pub name: String,
    /// Worksheet the type cell's hyperlink points at
    pub worksheet: Option<String>,
}

/// Ids are minted from a counter that restarts on [`LinkCache::clear`], so
/// the same workbook always yields the same ids.
#[derive(Debug, Clone, Default)]
pub struct LinkCache {
    entries: Vec<LinkEntry>,
}

impl LinkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, worksheet: Option<String>) -> LinkId {
        let id = LinkId(self.entries.len() as u32 + 1);
        self.entries.push(LinkEntry {
            id,
            name: name.into(),
            worksheet,
        });
        id
    }

    pub fn get(&self, id: LinkId) -> Option<&LinkEntry> {
        let index = id.0.checked_sub(1)? as usize;
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Where a schema can be found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Schema IRI, once known
    pub iri: Option<String>,
    /// Message id of the tool the reference belongs to
    pub tool: Option<String>,
}

impl ReferenceEntry {
    pub fn schema(iri: Option<String>) -> Self {
        Self { iri, tool: None }
    }

    pub fn tool(message_id: impl Into<String>) -> Self {
        Self {
            iri: None,
            tool: Some(message_id.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceCache {
    by_worksheet: HashMap<String, ReferenceEntry>,
    by_name: HashMap<String, ReferenceEntry>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_worksheet(&mut self, worksheet: impl Into<String>, entry: ReferenceEntry) {
        self.by_worksheet.insert(worksheet.into(), entry);
    }

    /// Register under a display name; an existing entry keeps precedence
    pub fn insert_name(&mut self, name: impl Into<String>, entry: ReferenceEntry) {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            tracing::warn!(name = %name, "duplicate schema name, keeping the first");
            return;
        }
        self.by_name.insert(name, entry);
    }

    /// Register under a display name, replacing any existing entry
    pub fn replace_name(&mut self, name: impl Into<String>, entry: ReferenceEntry) {
        self.by_name.insert(name.into(), entry);
    }

    pub fn by_worksheet(&self, worksheet: &str) -> Option<&ReferenceEntry> {
        self.by_worksheet.get(worksheet)
    }

    pub fn by_name(&self, name: &str) -> Option<&ReferenceEntry> {
        self.by_name.get(name)
    }

    /// Every entry in both keyspaces
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut ReferenceEntry> {
        self.by_worksheet.values_mut().chain(self.by_name.values_mut())
    }

    pub fn clear(&mut self) {
        self.by_worksheet.clear();
        self.by_name.clear();
    }
}
