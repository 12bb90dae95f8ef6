//! # swid-registry-core
//!
//! Entity registration workflow for the SWID registry.
//!
//! This subsystem is responsible for:
//! - Minting `did:key` identifiers for new entities
//! - Gating registrations on the caller's identity
//! - Claiming collision-free channel names for Agents
//! - Storing identity records with overwrite detection
//! - Writing private keys and finalized documents to disk
//!
//! A registration spans several systems with no shared transaction, so
//! [`RegistrationService`] tracks the steps it completed and reports them
//! when a later step fails.

#![warn(clippy::all)]

pub mod errors;
pub mod provider;
pub mod service;
pub mod traits;
pub mod types;

pub use errors::{AuthorizationError, MintError, RegistrationError, Result};
pub use provider::{KeyToolProvider, NativeIdentityProvider};
pub use service::{
    artifact_stem, base_channel_name, ArtifactCustodian, RegistrationService, RegistryStore,
    UniquenessNegotiator, UpsertOutcome,
};
pub use traits::{IdentityProvider, Registration};
pub use types::*;
