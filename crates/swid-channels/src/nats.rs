//! NATS JetStream broker.
//!
//! Every channel is a JetStream stream whose name and single subject are
//! the channel name. `get_or_create_stream` makes creation idempotent.

use crate::{traits::ChannelBroker, types::Announcement, ChannelError, Result};
use async_nats::jetstream::{self, stream::StorageType};
use async_nats::ConnectOptions;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Stream settings applied to every channel
#[derive(Debug, Clone)]
pub struct NatsChannelConfig {
    /// How long messages are retained
    pub max_age: Duration,
    /// Upper bound on stored bytes per channel
    pub max_bytes: i64,
    /// Storage backend for channel streams
    pub storage: StorageType,
}

impl Default for NatsChannelConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(7 * 24 * 3600),
            max_bytes: 64 * 1024 * 1024,
            storage: StorageType::File,
        }
    }
}

/// JetStream-backed [`ChannelBroker`]
#[derive(Clone)]
pub struct NatsChannelBroker {
    jetstream: jetstream::Context,
    config: NatsChannelConfig,
}

impl NatsChannelBroker {
    /// Connect to a NATS server
    pub async fn connect(url: &str, client_name: &str, config: NatsChannelConfig) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = ConnectOptions::new()
            .name(client_name)
            .connection_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(|e| ChannelError::Connection(e.to_string()))?;

        info!("Connected to NATS at {}", url);
        Ok(Self::from_client(client, config))
    }

    /// Wrap an existing client
    pub fn from_client(client: async_nats::Client, config: NatsChannelConfig) -> Self {
        Self {
            jetstream: jetstream::new(client),
            config,
        }
    }
}

#[async_trait]
impl ChannelBroker for NatsChannelBroker {
    async fn create_channel(&self, name: &str) -> Result<()> {
        self.jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: name.to_string(),
                subjects: vec![name.to_string()],
                max_age: self.config.max_age,
                max_bytes: self.config.max_bytes,
                storage: self.config.storage,
                ..Default::default()
            })
            .await
            .map_err(|e| ChannelError::CreateFailed {
                channel: name.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Using stream {} for channel", name);
        Ok(())
    }

    async fn publish(&self, name: &str, announcement: &Announcement) -> Result<()> {
        let payload = serde_json::to_vec(announcement)?;

        self.jetstream
            .publish(name.to_string(), payload.into())
            .await
            .map_err(|e| ChannelError::PublishFailed {
                channel: name.to_string(),
                reason: e.to_string(),
            })?
            .await
            .map_err(|e| ChannelError::PublishFailed {
                channel: name.to_string(),
                reason: format!("no acknowledgement: {}", e),
            })?;

        Ok(())
    }
}
