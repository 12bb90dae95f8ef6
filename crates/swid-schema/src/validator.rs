//! Document validation against the HSML entity contracts.

use crate::{
    document::EntityDocument,
    errors::{Result, SchemaError},
    kinds::*,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Schema URI every HSML document must list in `@context`
pub const HSML_CONTEXT_URI: &str =
    "https://digital-twin-interoperability.github.io/hsml-schema-context/hsml.jsonld";

/// Soft requirement a document misses; never blocks registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaWarning {
    /// Person without `affiliation`
    MissingAffiliation,
    /// Credential without `validFrom`/`validUntil`
    NoValidityWindow,
    /// Entity without `linkedTo`
    NotLinked,
}

impl std::fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SchemaWarning::MissingAffiliation => "'affiliation' field is missing",
            SchemaWarning::NoValidityWindow => "Credential has no expiration date",
            SchemaWarning::NotLinked => {
                "Object not linked to any other Entity; it will be registered under the registrar's SWID"
            }
        };
        f.write_str(s)
    }
}

/// A document accepted by the validator together with its advisories
#[derive(Debug, Clone)]
pub struct ValidatedDocument {
    pub document: EntityDocument,
    pub warnings: Vec<SchemaWarning>,
}

/// Validate raw JSON text
pub fn validate_str(input: &str) -> Result<ValidatedDocument> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
    validate_value(value)
}

/// Validate an already-parsed JSON value
pub fn validate_value(value: Value) -> Result<ValidatedDocument> {
    let Value::Object(fields) = value else {
        return Err(SchemaError::NotAnObject);
    };

    if !has_hsml_context(&fields) {
        return Err(SchemaError::InvalidContext {
            expected: HSML_CONTEXT_URI,
        });
    }

    let type_name = fields.get("@type").and_then(Value::as_str);
    let entity_type = type_name
        .and_then(EntityType::from_type_name)
        .ok_or_else(|| SchemaError::UnknownType(type_name.map(str::to_string)))?;

    let missing: Vec<String> = entity_type
        .required_fields()
        .iter()
        .filter(|field| !fields.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingFields(missing));
    }

    let kind = match entity_type {
        EntityType::Entity => EntityKind::Entity(typed_body(&fields)?),
        EntityType::Person => EntityKind::Person(typed_body(&fields)?),
        EntityType::Agent => EntityKind::Agent(typed_body(&fields)?),
        EntityType::Credential => EntityKind::Credential(typed_body(&fields)?),
        EntityType::Organization => EntityKind::Organization(typed_body(&fields)?),
    };

    if kind.name().trim().is_empty() {
        return Err(SchemaError::InvalidField {
            field: "name".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let warnings = kind.advisories();
    for warning in &warnings {
        warn!(entity_type = %entity_type, "Schema advisory: {}", warning);
    }
    debug!("HSML document accepted: {} '{}'", entity_type, kind.name());

    Ok(ValidatedDocument {
        document: EntityDocument::new(fields, kind),
        warnings,
    })
}

fn has_hsml_context(fields: &Map<String, Value>) -> bool {
    match fields.get("@context") {
        Some(Value::String(uri)) => uri == HSML_CONTEXT_URI,
        Some(Value::Array(entries)) => entries
            .iter()
            .any(|entry| entry.as_str() == Some(HSML_CONTEXT_URI)),
        _ => false,
    }
}

/// Deserialize the typed body once presence of every required field is known
///
/// Only `name` has a concrete type, so a failure here is always about it.
fn typed_body<T: EntityContract>(fields: &Map<String, Value>) -> Result<T> {
    T::deserialize(Value::Object(fields.clone())).map_err(|e| SchemaError::InvalidField {
        field: "name".to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_document(entity_type: EntityType) -> Value {
        let mut doc = json!({
            "@context": [HSML_CONTEXT_URI],
            "@type": entity_type.as_str(),
        });
        let obj = doc.as_object_mut().unwrap();
        for field in entity_type.required_fields() {
            obj.insert(field.to_string(), json!(format!("{} value", field)));
        }
        doc
    }

    #[test]
    fn test_accepts_complete_documents_for_every_type() {
        for entity_type in EntityType::ALL {
            let validated = validate_value(full_document(entity_type)).unwrap();
            assert_eq!(validated.document.entity_type(), entity_type);
            assert_eq!(validated.document.name(), "name value");
        }
    }

    #[test]
    fn test_missing_required_field_is_named() {
        for entity_type in EntityType::ALL {
            for field in entity_type.required_fields() {
                let mut doc = full_document(entity_type);
                doc.as_object_mut().unwrap().remove(*field);

                let err = validate_value(doc).unwrap_err();
                assert_eq!(
                    err,
                    SchemaError::MissingFields(vec![field.to_string()]),
                    "{} without {}",
                    entity_type,
                    field
                );
                assert_eq!(err.reason_code(), "missing_fields");
            }
        }
    }

    #[test]
    fn test_reports_every_missing_field_in_order() {
        let doc = json!({
            "@context": HSML_CONTEXT_URI,
            "@type": "Organization",
            "name": "Acme",
            "url": "https://acme.example",
        });

        let err = validate_value(doc).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingFields(vec![
                "description".to_string(),
                "address".to_string(),
                "logo".to_string(),
                "foundingDate".to_string(),
                "email".to_string(),
            ])
        );
    }

    #[test]
    fn test_context_marker_required() {
        let mut doc = full_document(EntityType::Person);
        doc.as_object_mut().unwrap().remove("@context");
        assert_eq!(
            validate_value(doc).unwrap_err().reason_code(),
            "invalid_context"
        );

        let mut doc = full_document(EntityType::Person);
        doc["@context"] = json!(["https://schema.org"]);
        assert_eq!(
            validate_value(doc).unwrap_err().reason_code(),
            "invalid_context"
        );

        let mut doc = full_document(EntityType::Person);
        doc["@context"] = json!(HSML_CONTEXT_URI);
        assert!(validate_value(doc).is_ok());
    }

    #[test]
    fn test_unknown_or_missing_type() {
        let mut doc = full_document(EntityType::Entity);
        doc["@type"] = json!("Robot");
        assert_eq!(
            validate_value(doc).unwrap_err(),
            SchemaError::UnknownType(Some("Robot".to_string()))
        );

        let mut doc = full_document(EntityType::Entity);
        doc.as_object_mut().unwrap().remove("@type");
        assert_eq!(validate_value(doc).unwrap_err(), SchemaError::UnknownType(None));
    }

    #[test]
    fn test_invalid_json_and_non_objects() {
        assert_eq!(
            validate_str("{not json").unwrap_err().reason_code(),
            "invalid_json"
        );
        assert_eq!(
            validate_str("[1, 2, 3]").unwrap_err(),
            SchemaError::NotAnObject
        );
    }

    #[test]
    fn test_name_must_be_non_empty_string() {
        let mut doc = full_document(EntityType::Entity);
        doc["name"] = json!(42);
        let err = validate_value(doc).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { ref field, .. } if field == "name"));

        let mut doc = full_document(EntityType::Entity);
        doc["name"] = json!("   ");
        assert_eq!(validate_value(doc).unwrap_err().reason_code(), "invalid_field");
    }

    #[test]
    fn test_advisories_do_not_block() {
        let validated = validate_value(full_document(EntityType::Person)).unwrap();
        assert_eq!(validated.warnings, vec![SchemaWarning::MissingAffiliation]);

        let validated = validate_value(full_document(EntityType::Credential)).unwrap();
        assert_eq!(validated.warnings, vec![SchemaWarning::NoValidityWindow]);

        let validated = validate_value(full_document(EntityType::Entity)).unwrap();
        assert_eq!(validated.warnings, vec![SchemaWarning::NotLinked]);

        let validated = validate_value(full_document(EntityType::Agent)).unwrap();
        assert!(validated.warnings.is_empty());
    }

    #[test]
    fn test_satisfied_advisories_are_silent() {
        let mut doc = full_document(EntityType::Credential);
        doc["validFrom"] = json!("2025-01-01");
        doc["validUntil"] = json!("2026-01-01");
        assert!(validate_value(doc).unwrap().warnings.is_empty());

        let mut doc = full_document(EntityType::Person);
        doc["affiliation"] = json!("JPL");
        assert!(validate_value(doc).unwrap().warnings.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let mut doc = full_document(EntityType::Agent);
        doc["capabilities"] = json!(["navigate", "report"]);

        let validated = validate_value(doc).unwrap();
        assert_eq!(
            validated.document.fields()["capabilities"],
            json!(["navigate", "report"])
        );
    }

    #[test]
    fn test_identifier_attachment() {
        let mut validated = validate_value(full_document(EntityType::Person)).unwrap();
        assert_eq!(validated.document.identifier(), None);

        validated.document.set_identifier("did:key:z6MkTest");
        assert_eq!(validated.document.identifier(), Some("did:key:z6MkTest"));

        let stored: Value = serde_json::from_str(&validated.document.to_json_string()).unwrap();
        assert_eq!(stored["swid"], json!("did:key:z6MkTest"));
    }
}
