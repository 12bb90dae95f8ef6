//! # swid-schema
//!
//! Validation of HSML entity documents.
//!
//! A document is accepted when it is a JSON object whose `@context` names
//! the HSML schema, whose `@type` is one of the five entity kinds, and which
//! carries every field its kind requires. Each kind is a typed variant of
//! [`EntityKind`]; its required-field list lives next to its struct.

#![warn(clippy::all)]

pub mod document;
pub mod errors;
pub mod kinds;
pub mod validator;

pub use document::{EntityDocument, IDENTIFIER_FIELD};
pub use errors::{Result, SchemaError};
pub use kinds::{
    AgentBody, CredentialBody, EntityBody, EntityContract, EntityKind, EntityType, OrganizationBody,
    PersonBody,
};
pub use validator::{validate_str, validate_value, SchemaWarning, ValidatedDocument, HSML_CONTEXT_URI};
