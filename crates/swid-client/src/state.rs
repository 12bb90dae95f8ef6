/*!
 * Process-scoped collaborators
 *
 * The store and broker are opened once and injected into the registration
 * service; the choice of backend comes from configuration.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use swid_channels::{
    Announcement, ChannelBroker, InMemoryChannelBroker, NatsChannelBroker, NatsChannelConfig,
};
use swid_registry_core::{
    IdentityProvider, KeyToolProvider, MintError, MintedIdentity, NativeIdentityProvider,
    RegistrationService,
};
use swid_storage::RocksDbStorage;
use tracing::{info, warn};

use crate::config::Config;

/// Identity provider selected by configuration
pub enum Provider {
    Native(NativeIdentityProvider),
    KeyTool(KeyToolProvider),
}

#[async_trait]
impl IdentityProvider for Provider {
    async fn mint(&self) -> Result<MintedIdentity, MintError> {
        match self {
            Provider::Native(provider) => provider.mint().await,
            Provider::KeyTool(provider) => provider.mint().await,
        }
    }
}

/// Channel broker selected by configuration
pub enum Broker {
    Nats(NatsChannelBroker),
    Memory(InMemoryChannelBroker),
}

#[async_trait]
impl ChannelBroker for Broker {
    async fn create_channel(&self, name: &str) -> swid_channels::Result<()> {
        match self {
            Broker::Nats(broker) => broker.create_channel(name).await,
            Broker::Memory(broker) => broker.create_channel(name).await,
        }
    }

    async fn publish(&self, name: &str, announcement: &Announcement) -> swid_channels::Result<()> {
        match self {
            Broker::Nats(broker) => broker.publish(name, announcement).await,
            Broker::Memory(broker) => broker.publish(name, announcement).await,
        }
    }
}

pub type Service = RegistrationService<Provider, Broker, RocksDbStorage>;

/// Application state shared by all commands
pub struct AppState {
    pub config: Config,
    pub service: Arc<Service>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        // Initialize storage
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let storage = Arc::new(
            RocksDbStorage::open(&config.database_path)
                .with_context(|| format!("Failed to open {}", config.database_path.display()))?,
        );

        let provider = match &config.key_tool {
            Some(tool) => {
                info!("Minting identities with {}", tool.program.display());
                Provider::KeyTool(KeyToolProvider::new(
                    &tool.program,
                    tool.args.clone(),
                    &tool.working_dir,
                ))
            }
            None => Provider::Native(NativeIdentityProvider::new()),
        };

        let broker = match &config.nats_url {
            Some(url) => Broker::Nats(
                NatsChannelBroker::connect(url, "swid-registry", NatsChannelConfig::default())
                    .await?,
            ),
            None => {
                warn!("SWID_NATS_URL not set; Agent channels are kept in memory for this run");
                Broker::Memory(InMemoryChannelBroker::new())
            }
        };

        let service = Arc::new(RegistrationService::new(
            Arc::new(provider),
            Arc::new(broker),
            storage,
            config.registration(),
        ));

        Ok(Self { config, service })
    }
}
