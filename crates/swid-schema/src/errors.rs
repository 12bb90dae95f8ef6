//! Schema validation error types.

use thiserror::Error;

/// Reasons a document is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Input is not parseable JSON
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),

    /// Input parsed but is not a JSON object
    #[error("Document is not a valid JSON object")]
    NotAnObject,

    /// `@context` missing or does not name the HSML schema
    #[error("Not a valid HSML JSON: @context must include {expected}")]
    InvalidContext {
        /// The schema URI that must be present
        expected: &'static str,
    },

    /// `@type` missing or not a recognized entity kind
    #[error("Unknown or missing entity type: {}", .0.as_deref().unwrap_or("<none>"))]
    UnknownType(Option<String>),

    /// Required fields absent for the declared kind
    #[error("Missing required fields: {0:?}")]
    MissingFields(Vec<String>),

    /// A field is present but malformed
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

impl SchemaError {
    /// Stable machine-checkable reason
    pub fn reason_code(&self) -> &'static str {
        match self {
            SchemaError::InvalidJson(_) => "invalid_json",
            SchemaError::NotAnObject => "not_an_object",
            SchemaError::InvalidContext { .. } => "invalid_context",
            SchemaError::UnknownType(_) => "unknown_type",
            SchemaError::MissingFields(_) => "missing_fields",
            SchemaError::InvalidField { .. } => "invalid_field",
        }
    }
}

/// Result type for schema validation
pub type Result<T> = std::result::Result<T, SchemaError>;
