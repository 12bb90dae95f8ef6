//! Entity kinds and their field contracts.

use crate::validator::SchemaWarning;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Closed set of entity types recognized by the registry
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Entity = 0x01,
    Person = 0x02,
    Agent = 0x03,
    Credential = 0x04,
    Organization = 0x05,
}

impl EntityType {
    /// Every recognized type
    pub const ALL: [EntityType; 5] = [
        EntityType::Entity,
        EntityType::Person,
        EntityType::Agent,
        EntityType::Credential,
        EntityType::Organization,
    ];

    /// The `@type` string for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Entity => "Entity",
            EntityType::Person => "Person",
            EntityType::Agent => "Agent",
            EntityType::Credential => "Credential",
            EntityType::Organization => "Organization",
        }
    }

    /// Parse an `@type` string
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Fields a document of this type must carry
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            EntityType::Entity => EntityBody::REQUIRED,
            EntityType::Person => PersonBody::REQUIRED,
            EntityType::Agent => AgentBody::REQUIRED,
            EntityType::Credential => CredentialBody::REQUIRED,
            EntityType::Organization => OrganizationBody::REQUIRED,
        }
    }

    /// Whether records of this type may register other entities
    pub fn can_register_others(&self) -> bool {
        matches!(self, EntityType::Person | EntityType::Organization)
    }

    /// Whether records of this type get a dedicated messaging channel
    pub fn requires_channel(&self) -> bool {
        matches!(self, EntityType::Agent)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field contract of one entity kind
///
/// `REQUIRED` lists the JSON names of the struct's non-optional fields.
pub trait EntityContract: DeserializeOwned {
    /// Kind described by this contract
    const TYPE: EntityType;

    /// Required JSON field names, in reporting order
    const REQUIRED: &'static [&'static str];

    /// Display name of the entity
    fn name(&self) -> &str;

    /// Non-blocking soft requirements this document misses
    fn advisories(&self) -> Vec<SchemaWarning> {
        Vec::new()
    }
}

/// Generic `Entity`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBody {
    pub name: String,
    pub description: Value,
    #[serde(default)]
    pub linked_to: Option<Value>,
}

impl EntityContract for EntityBody {
    const TYPE: EntityType = EntityType::Entity;
    const REQUIRED: &'static [&'static str] = &["name", "description"];

    fn name(&self) -> &str {
        &self.name
    }

    fn advisories(&self) -> Vec<SchemaWarning> {
        if self.linked_to.is_none() {
            vec![SchemaWarning::NotLinked]
        } else {
            Vec::new()
        }
    }
}

/// `Person`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonBody {
    pub name: String,
    pub birth_date: Value,
    pub email: Value,
    #[serde(default)]
    pub affiliation: Option<Value>,
}

impl EntityContract for PersonBody {
    const TYPE: EntityType = EntityType::Person;
    const REQUIRED: &'static [&'static str] = &["name", "birthDate", "email"];

    fn name(&self) -> &str {
        &self.name
    }

    fn advisories(&self) -> Vec<SchemaWarning> {
        if self.affiliation.is_none() {
            vec![SchemaWarning::MissingAffiliation]
        } else {
            Vec::new()
        }
    }
}

/// `Agent`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentBody {
    pub name: String,
    pub creator: Value,
    pub date_created: Value,
    pub date_modified: Value,
    pub description: Value,
}

impl EntityContract for AgentBody {
    const TYPE: EntityType = EntityType::Agent;
    const REQUIRED: &'static [&'static str] = &[
        "name",
        "creator",
        "dateCreated",
        "dateModified",
        "description",
    ];

    fn name(&self) -> &str {
        &self.name
    }
}

/// `Credential`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBody {
    pub name: String,
    pub description: Value,
    pub issued_by: Value,
    pub access_authorization: Value,
    pub authorized_for_domain: Value,
    #[serde(default)]
    pub valid_from: Option<Value>,
    #[serde(default)]
    pub valid_until: Option<Value>,
}

impl EntityContract for CredentialBody {
    const TYPE: EntityType = EntityType::Credential;
    const REQUIRED: &'static [&'static str] = &[
        "name",
        "description",
        "issuedBy",
        "accessAuthorization",
        "authorizedForDomain",
    ];

    fn name(&self) -> &str {
        &self.name
    }

    fn advisories(&self) -> Vec<SchemaWarning> {
        if self.valid_from.is_none() || self.valid_until.is_none() {
            vec![SchemaWarning::NoValidityWindow]
        } else {
            Vec::new()
        }
    }
}

/// `Organization`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationBody {
    pub name: String,
    pub description: Value,
    pub url: Value,
    pub address: Value,
    pub logo: Value,
    pub founding_date: Value,
    pub email: Value,
}

impl EntityContract for OrganizationBody {
    const TYPE: EntityType = EntityType::Organization;
    const REQUIRED: &'static [&'static str] = &[
        "name",
        "description",
        "url",
        "address",
        "logo",
        "foundingDate",
        "email",
    ];

    fn name(&self) -> &str {
        &self.name
    }
}

/// A validated document body, one variant per entity type
#[derive(Debug, Clone)]
pub enum EntityKind {
    Entity(EntityBody),
    Person(PersonBody),
    Agent(AgentBody),
    Credential(CredentialBody),
    Organization(OrganizationBody),
}

impl EntityKind {
    /// The declared type
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKind::Entity(_) => EntityBody::TYPE,
            EntityKind::Person(_) => PersonBody::TYPE,
            EntityKind::Agent(_) => AgentBody::TYPE,
            EntityKind::Credential(_) => CredentialBody::TYPE,
            EntityKind::Organization(_) => OrganizationBody::TYPE,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        match self {
            EntityKind::Entity(body) => body.name(),
            EntityKind::Person(body) => body.name(),
            EntityKind::Agent(body) => body.name(),
            EntityKind::Credential(body) => body.name(),
            EntityKind::Organization(body) => body.name(),
        }
    }

    /// Soft-requirement warnings for this body
    pub fn advisories(&self) -> Vec<SchemaWarning> {
        match self {
            EntityKind::Entity(body) => body.advisories(),
            EntityKind::Person(body) => body.advisories(),
            EntityKind::Agent(body) => body.advisories(),
            EntityKind::Credential(body) => body.advisories(),
            EntityKind::Organization(body) => body.advisories(),
        }
    }
}
