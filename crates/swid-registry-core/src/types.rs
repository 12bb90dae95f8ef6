//! Core types for entity registration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

pub use swid_channels::RetryPolicy;
pub use swid_crypto::{current_timestamp, PrivateKeyPem};
pub use swid_schema::{EntityType, SchemaWarning};

/// A registered entity, keyed by its identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// `did:key` identifier (primary key)
    pub identifier: String,

    /// Multibase public key: the identifier without the `did:key:` prefix
    pub public_key: String,

    /// Finalized document as compact JSON
    pub document: String,

    /// Identifier of the Person or Organization that registered this entity
    pub registered_by: String,

    /// Dedicated messaging channel (Agents only)
    pub channel_name: Option<String>,

    /// Declared `@type`
    pub entity_type: EntityType,

    /// Document `name`
    pub display_name: String,

    /// First registration (Unix seconds)
    pub registered_at: u64,

    /// Last overwrite (Unix seconds)
    pub updated_at: u64,
}

impl IdentityRecord {
    /// Whether this record may act as a registrar for other entities
    pub fn can_register_others(&self) -> bool {
        self.entity_type.can_register_others()
    }

    /// Whether the entity registered itself
    pub fn is_self_registered(&self) -> bool {
        self.registered_by == self.identifier
    }

    /// Parse the stored document
    pub fn document_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.document)
    }
}

/// Identity acting as registrar for a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registrar {
    pub identifier: String,
    pub entity_type: EntityType,
    pub display_name: String,
}

impl From<&IdentityRecord> for Registrar {
    fn from(record: &IdentityRecord) -> Self {
        Self {
            identifier: record.identifier.clone(),
            entity_type: record.entity_type,
            display_name: record.display_name.clone(),
        }
    }
}

/// Who is submitting a registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No identity yet; may only bootstrap a Person or Organization
    Unauthenticated,
    /// Logged in with the private key of a registered Person or Organization
    Authenticated(Registrar),
}

impl Caller {
    /// The caller's identifier, if logged in
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Caller::Unauthenticated => None,
            Caller::Authenticated(registrar) => Some(&registrar.identifier),
        }
    }
}

/// A document submitted for registration
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Raw JSON document
    pub document: String,
    /// Directory receiving the private key and document files
    pub output_dir: PathBuf,
}

impl RegistrationRequest {
    pub fn new(document: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Build a request from an already-parsed document
    pub fn from_value(document: &serde_json::Value, output_dir: impl Into<PathBuf>) -> Self {
        Self::new(document.to_string(), output_dir)
    }
}

/// Identifier and key returned by an identity provider
#[derive(Debug)]
pub struct MintedIdentity {
    pub identifier: String,
    pub private_key: PrivateKeyPem,
}

/// Non-fatal condition surfaced on a receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationWarning {
    /// Schema advisory
    Schema(SchemaWarning),

    /// An existing record was replaced
    Overwrote {
        identifier: String,
        previous_registered_by: String,
        previous_channel: Option<String>,
    },

    /// The claimed channel could not be created on the broker
    ChannelProvisioningFailed { channel: String, reason: String },

    /// The announcement could not be published
    AnnouncementFailed { channel: String, reason: String },
}

impl std::fmt::Display for RegistrationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationWarning::Schema(warning) => write!(f, "{}", warning),
            RegistrationWarning::Overwrote {
                identifier,
                previous_registered_by,
                previous_channel,
            } => {
                write!(
                    f,
                    "Existing record {} (registered by {}) was overwritten",
                    identifier, previous_registered_by
                )?;
                if let Some(channel) = previous_channel {
                    write!(f, "; channel '{}' is no longer bound to it", channel)?;
                }
                Ok(())
            }
            RegistrationWarning::ChannelProvisioningFailed { channel, reason } => {
                write!(f, "Channel '{}' could not be created: {}", channel, reason)
            }
            RegistrationWarning::AnnouncementFailed { channel, reason } => {
                write!(f, "Announcement on '{}' failed: {}", channel, reason)
            }
        }
    }
}

/// Successful registration
#[derive(Debug, Clone)]
pub struct RegistrationReceipt {
    pub registration_id: Uuid,
    pub identifier: String,
    pub record: IdentityRecord,
    /// Absent when an existing identifier was reused
    pub private_key_path: Option<PathBuf>,
    pub document_path: PathBuf,
    pub warnings: Vec<RegistrationWarning>,
}

impl RegistrationReceipt {
    /// Caller state for the registered identity
    ///
    /// `Some` when the new record may register others, which makes a
    /// successful bootstrap registration a login.
    pub fn caller(&self) -> Option<Caller> {
        self.record
            .can_register_others()
            .then(|| Caller::Authenticated(Registrar::from(&self.record)))
    }

    /// Whether an existing record was replaced
    pub fn overwrote(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, RegistrationWarning::Overwrote { .. }))
    }
}

/// Side effect a registration has committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletedStep {
    /// A fresh identifier was minted
    Minted { identifier: String },
    /// An existing identifier is being re-registered
    ReusedIdentifier { identifier: String },
    /// A channel name was permanently claimed
    ChannelClaimed { channel: String },
    /// The channel exists on the broker
    ChannelProvisioned { channel: String },
    /// The announcement was published
    Announced { channel: String },
    /// The record was written to the registry store
    RecordStored { identifier: String },
    /// Private key file written
    KeyWritten { path: PathBuf },
    /// Document file written
    DocumentWritten { path: PathBuf },
}

impl std::fmt::Display for CompletedStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletedStep::Minted { identifier } => write!(f, "minted identity {}", identifier),
            CompletedStep::ReusedIdentifier { identifier } => {
                write!(f, "reused identity {}", identifier)
            }
            CompletedStep::ChannelClaimed { channel } => write!(f, "claimed channel '{}'", channel),
            CompletedStep::ChannelProvisioned { channel } => {
                write!(f, "created channel '{}'", channel)
            }
            CompletedStep::Announced { channel } => write!(f, "announced on '{}'", channel),
            CompletedStep::RecordStored { identifier } => {
                write!(f, "stored record {}", identifier)
            }
            CompletedStep::KeyWritten { path } => write!(f, "wrote key {}", path.display()),
            CompletedStep::DocumentWritten { path } => {
                write!(f, "wrote document {}", path.display())
            }
        }
    }
}

/// Step of the registration pipeline that can fail after side effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStage {
    ChannelClaim,
    Upsert,
    WriteArtifacts,
}

impl std::fmt::Display for RegistrationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RegistrationStage::ChannelClaim => "channel_claim",
            RegistrationStage::Upsert => "upsert",
            RegistrationStage::WriteArtifacts => "write_artifacts",
        };
        f.write_str(s)
    }
}

/// Journal entry for a registration that failed after side effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub registration_id: Uuid,
    pub identifier: String,
    pub stage: RegistrationStage,
    pub completed: Vec<CompletedStep>,
    pub reason: String,
    pub recorded_at: u64,
}

/// Tunables for [`crate::RegistrationService`]
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// Upper bound for every mint and store call
    pub external_timeout: Duration,
    /// Candidate channel names tried before giving up
    pub channel_claim_attempts: u32,
    /// Retry policy for channel creation and announcement
    pub channel_retry: RetryPolicy,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            external_timeout: Duration::from_secs(10),
            channel_claim_attempts: 16,
            channel_retry: RetryPolicy::default(),
        }
    }
}
