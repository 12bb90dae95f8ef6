//! Trait definitions for the registration subsystem.

use crate::{errors::*, types::*};
use async_trait::async_trait;

/// Source of fresh identities
///
/// Each call yields a new identifier and the private key behind it. A
/// returned key is handed to the caller exactly once.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Mint a new identity
    async fn mint(&self) -> std::result::Result<MintedIdentity, MintError>;
}

/// Registration front door
#[async_trait]
pub trait Registration: Send + Sync {
    /// Authenticate with a PKCS#8 private key PEM
    ///
    /// The key must belong to a registered Person or Organization.
    async fn login(&self, private_key_pem: &str) -> Result<Caller>;

    /// Register a document on behalf of `caller`
    async fn register(
        &self,
        caller: &Caller,
        request: RegistrationRequest,
    ) -> Result<RegistrationReceipt>;

    /// Get a record by identifier
    async fn get_record(&self, identifier: &str) -> Result<Option<IdentityRecord>>;

    /// List records credited to a registrar
    async fn records_registered_by(&self, registrar: &str) -> Result<Vec<IdentityRecord>>;

    /// List journaled partial failures
    async fn reconciliation_reports(&self) -> Result<Vec<ReconciliationReport>>;
}
