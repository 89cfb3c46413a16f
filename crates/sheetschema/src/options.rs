//! Compiler configuration

use crate::dictionary::Dictionary;
use crate::field_type::FieldTypeRegistry;

/// Options for a [`SchemaCompiler`](crate::SchemaCompiler)
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    /// Header labels and keywords
    pub dictionary: Dictionary,
    /// Known field types
    pub registry: FieldTypeRegistry,
    /// Separator of multiple example answers (default: `,`)
    pub example_delimiter: char,
    /// Separator of enum values in a parameter cell (default: newline)
    pub enum_delimiter: char,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            dictionary: Dictionary::default(),
            registry: FieldTypeRegistry::default(),
            example_delimiter: ',',
            enum_delimiter: '\n',
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn with_registry(mut self, registry: FieldTypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_example_delimiter(mut self, delimiter: char) -> Self {
        self.example_delimiter = delimiter;
        self
    }

    pub fn with_enum_delimiter(mut self, delimiter: char) -> Self {
        self.enum_delimiter = delimiter;
        self
    }
}
