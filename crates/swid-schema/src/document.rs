//! Validated HSML entity documents.

use crate::kinds::{EntityKind, EntityType};
use serde_json::{Map, Value};

/// Document field holding the entity's identifier (its SWID)
pub const IDENTIFIER_FIELD: &str = "swid";

/// A document that passed validation
///
/// `fields` keeps every key the caller supplied, in order, so the
/// persisted document is the caller's document plus the identifier.
#[derive(Debug, Clone)]
pub struct EntityDocument {
    fields: Map<String, Value>,
    kind: EntityKind,
}

impl EntityDocument {
    pub(crate) fn new(fields: Map<String, Value>, kind: EntityKind) -> Self {
        Self { fields, kind }
    }

    /// Declared entity type
    pub fn entity_type(&self) -> EntityType {
        self.kind.entity_type()
    }

    /// Typed body
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Display name
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Identifier carried by the document, if any
    pub fn identifier(&self) -> Option<&str> {
        self.fields.get(IDENTIFIER_FIELD).and_then(Value::as_str)
    }

    /// Attach the identifier under which the document is registered
    pub fn set_identifier(&mut self, identifier: &str) {
        self.fields.insert(
            IDENTIFIER_FIELD.to_string(),
            Value::String(identifier.to_string()),
        );
    }

    /// Raw field map
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The document as a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Compact JSON serialization (the stored form)
    pub fn to_json_string(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}
