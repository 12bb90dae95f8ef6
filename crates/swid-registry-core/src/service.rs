//! Registration service implementation.

mod auth;
mod custodian;
mod negotiator;
mod orchestrator;
mod store;

pub use custodian::{artifact_stem, ArtifactCustodian};
pub use negotiator::{base_channel_name, UniquenessNegotiator};
pub use store::{RegistryStore, UpsertOutcome};

use crate::{errors::*, traits::*, types::*};
use async_trait::async_trait;
use std::sync::Arc;
use swid_channels::{ChannelBroker, ChannelProvisioner};
use swid_storage::Storage;

/// Registration service
///
/// Collaborators are process-scoped and injected once; the service itself
/// holds no per-registration state, so one instance serves concurrent
/// registrations.
pub struct RegistrationService<P, B, S>
where
    P: IdentityProvider,
    B: ChannelBroker,
    S: Storage,
{
    provider: Arc<P>,
    store: Arc<RegistryStore<S>>,
    negotiator: UniquenessNegotiator<S>,
    provisioner: ChannelProvisioner<B>,
    custodian: ArtifactCustodian,
    config: RegistrationConfig,
}

impl<P, B, S> RegistrationService<P, B, S>
where
    P: IdentityProvider,
    B: ChannelBroker,
    S: Storage,
{
    /// Create a new registration service
    pub fn new(
        provider: Arc<P>,
        broker: Arc<B>,
        storage: Arc<S>,
        config: RegistrationConfig,
    ) -> Self {
        let store = Arc::new(RegistryStore::new(storage));
        Self {
            provider,
            negotiator: UniquenessNegotiator::new(store.clone(), config.channel_claim_attempts),
            provisioner: ChannelProvisioner::new(broker, config.channel_retry),
            store,
            custodian: ArtifactCustodian::new(),
            config,
        }
    }

    /// The underlying registry store
    pub fn store(&self) -> &Arc<RegistryStore<S>> {
        &self.store
    }
}

#[async_trait]
impl<P, B, S> Registration for RegistrationService<P, B, S>
where
    P: IdentityProvider + 'static,
    B: ChannelBroker + 'static,
    S: Storage + 'static,
{
    async fn login(&self, private_key_pem: &str) -> Result<Caller> {
        self.login_internal(private_key_pem).await
    }

    async fn register(
        &self,
        caller: &Caller,
        request: RegistrationRequest,
    ) -> Result<RegistrationReceipt> {
        self.register_internal(caller, request).await
    }

    async fn get_record(&self, identifier: &str) -> Result<Option<IdentityRecord>> {
        Ok(self.store.get(identifier).await?)
    }

    async fn records_registered_by(&self, registrar: &str) -> Result<Vec<IdentityRecord>> {
        Ok(self.store.records_registered_by(registrar).await?)
    }

    async fn reconciliation_reports(&self) -> Result<Vec<ReconciliationReport>> {
        Ok(self.store.reconciliation_reports().await?)
    }
}
