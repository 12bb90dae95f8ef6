//! Registration error types.

use crate::types::{CompletedStep, EntityType, RegistrationStage};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for registration operations
pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Registration errors
///
/// Every variant maps to a stable reason string via
/// [`RegistrationError::reason_code`].
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Document rejected by the schema validator
    #[error("Invalid document: {0}")]
    Validation(#[from] swid_schema::SchemaError),

    /// Caller may not perform this registration
    #[error("Not authorized: {0}")]
    Authorization(#[from] AuthorizationError),

    /// Identity provider failed; nothing was committed
    #[error("Identity mint failed: {0}")]
    IdentityMint(#[from] MintError),

    /// No free channel name within the claim budget
    #[error("No free channel name for '{base}' after {attempts} attempts")]
    Negotiation {
        base: String,
        attempts: u32,
        completed: Vec<CompletedStep>,
    },

    /// Store or filesystem failure after side effects were committed
    #[error("Registration failed at {stage}: {reason}")]
    Persistence {
        stage: RegistrationStage,
        completed: Vec<CompletedStep>,
        reason: String,
    },

    /// Storage failure before any side effect
    #[error("Storage error: {0}")]
    Storage(#[from] swid_storage::StorageError),
}

impl RegistrationError {
    /// Machine-checkable reason string
    pub fn reason_code(&self) -> &'static str {
        match self {
            RegistrationError::Validation(e) => e.reason_code(),
            RegistrationError::Authorization(e) => e.reason_code(),
            RegistrationError::IdentityMint(_) => "mint_failure",
            RegistrationError::Negotiation { .. } => "negotiation_failure",
            RegistrationError::Persistence { .. } | RegistrationError::Storage(_) => {
                "persistence_failure"
            }
        }
    }

    /// Side effects committed before the failure
    pub fn completed_steps(&self) -> &[CompletedStep] {
        match self {
            RegistrationError::Negotiation { completed, .. }
            | RegistrationError::Persistence { completed, .. } => completed,
            _ => &[],
        }
    }

    /// Whether the failure left side effects behind
    pub fn is_partial_failure(&self) -> bool {
        !self.completed_steps().is_empty()
    }
}

/// Authentication gate rejections
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// An unauthenticated caller submitted a type other than Person/Organization
    #[error("Log in to register a {0}; only a Person or Organization can register without an identity")]
    Unauthenticated(EntityType),

    /// Reusing an existing identifier requires a login
    #[error("Log in to re-register {0}")]
    LoginRequiredForOverwrite(String),

    /// Private key could not be read or parsed
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Key derives an identifier with no record
    #[error("No registered entity for {0}")]
    UnknownIdentity(String),

    /// Caller's record is not a Person or Organization
    #[error("{identifier} is a {entity_type}; only a Person or Organization can register entities")]
    NotRegistrar {
        identifier: String,
        entity_type: EntityType,
    },

    /// Caller is neither the identity nor its registrar
    #[error("{caller} may not re-register {identifier}")]
    NotOwner { caller: String, identifier: String },

    /// Overwrite would turn a registrar into a type that cannot register
    #[error("{identifier} is a {from} and may not be re-registered as a {to}")]
    RegistrarDemotion {
        identifier: String,
        from: EntityType,
        to: EntityType,
    },
}

impl AuthorizationError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            AuthorizationError::Unauthenticated(_)
            | AuthorizationError::LoginRequiredForOverwrite(_)
            | AuthorizationError::InvalidKey(_)
            | AuthorizationError::UnknownIdentity(_) => "unauthenticated",
            AuthorizationError::NotRegistrar { .. }
            | AuthorizationError::NotOwner { .. }
            | AuthorizationError::RegistrarDemotion { .. } => "unauthorized",
        }
    }
}

/// Identity provider failures
#[derive(Debug, Error)]
pub enum MintError {
    /// Key tool could not be run or exited abnormally
    #[error("Key tool failed: {0}")]
    ToolFailed(String),

    /// Key tool output carried no identifier
    #[error("Key tool output has no 'Generated DID:key:' line")]
    IdentifierMissing,

    /// Key tool produced no private key file
    #[error("Private key file not found: {0}")]
    KeyArtifactMissing(PathBuf),

    /// Key tool's identifier is not the one its key derives
    #[error("Key tool reported {reported} but the private key derives {derived}")]
    IdentifierMismatch { reported: String, derived: String },

    /// Mint did not complete in time
    #[error("Identity mint timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key generation or encoding failed
    #[error("Crypto error: {0}")]
    Crypto(#[from] swid_crypto::CryptoError),
}
