//! Broker trait definition.

use crate::{types::Announcement, Result};
use async_trait::async_trait;

/// Topic-admin and publish operations of a messaging broker
///
/// Injected into the provisioner so the registry never depends on a
/// concrete broker client.
#[async_trait]
pub trait ChannelBroker: Send + Sync {
    /// Create a channel
    ///
    /// Creating a channel that already exists must succeed.
    async fn create_channel(&self, name: &str) -> Result<()>;

    /// Publish an announcement to an existing channel
    async fn publish(&self, name: &str, announcement: &Announcement) -> Result<()>;
}
