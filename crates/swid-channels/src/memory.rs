//! Process-local broker.

use crate::{traits::ChannelBroker, types::Announcement, ChannelError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Broker that keeps channels and their messages in memory
///
/// Used when no broker URL is configured and throughout the test suites.
#[derive(Default)]
pub struct InMemoryChannelBroker {
    channels: RwLock<HashMap<String, Vec<Announcement>>>,
}

impl InMemoryChannelBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every created channel, sorted
    pub async fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Messages published to a channel so far
    pub async fn messages(&self, name: &str) -> Vec<Announcement> {
        self.channels
            .read()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChannelBroker for InMemoryChannelBroker {
    async fn create_channel(&self, name: &str) -> Result<()> {
        let mut channels = self.channels.write().await;
        if channels.contains_key(name) {
            debug!("Channel '{}' already exists", name);
        } else {
            channels.insert(name.to_string(), Vec::new());
            debug!("Channel '{}' created", name);
        }
        Ok(())
    }

    async fn publish(&self, name: &str, announcement: &Announcement) -> Result<()> {
        let mut channels = self.channels.write().await;
        let messages = channels
            .get_mut(name)
            .ok_or_else(|| ChannelError::UnknownChannel(name.to_string()))?;
        messages.push(announcement.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let broker = InMemoryChannelBroker::new();
        broker.create_channel("scout_one_a1b2c3").await.unwrap();
        broker
            .publish("scout_one_a1b2c3", &Announcement::new("hello"))
            .await
            .unwrap();

        // Re-creating keeps the existing messages
        broker.create_channel("scout_one_a1b2c3").await.unwrap();

        assert_eq!(broker.channels().await, vec!["scout_one_a1b2c3".to_string()]);
        assert_eq!(broker.messages("scout_one_a1b2c3").await.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_requires_channel() {
        let broker = InMemoryChannelBroker::new();
        let result = broker.publish("missing", &Announcement::new("hello")).await;
        assert!(matches!(result, Err(ChannelError::UnknownChannel(_))));
    }
}
