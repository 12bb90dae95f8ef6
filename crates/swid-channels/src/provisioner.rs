//! Retrying wrapper around a [`ChannelBroker`].

use crate::{traits::ChannelBroker, types::Announcement, types::RetryPolicy, ChannelError, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Provisions channels and publishes announcements with retry
///
/// Every attempt is bounded by [`RetryPolicy::attempt_timeout`]. Failed
/// attempts back off exponentially until the attempt budget is spent, and
/// the last error is returned.
pub struct ChannelProvisioner<B: ChannelBroker> {
    broker: Arc<B>,
    policy: RetryPolicy,
}

impl<B: ChannelBroker> ChannelProvisioner<B> {
    pub fn new(broker: Arc<B>, policy: RetryPolicy) -> Self {
        Self { broker, policy }
    }

    /// Create the channel, retrying on failure
    pub async fn provision(&self, name: &str) -> Result<()> {
        self.with_retry("create", name, || self.broker.create_channel(name))
            .await?;
        info!("Channel '{}' provisioned", name);
        Ok(())
    }

    /// Publish an announcement to an existing channel, retrying on failure
    pub async fn announce(&self, name: &str, announcement: &Announcement) -> Result<()> {
        self.with_retry("publish", name, || self.broker.publish(name, announcement))
            .await?;
        info!("Announcement published on channel '{}'", name);
        Ok(())
    }

    async fn with_retry<F, Fut>(&self, operation: &'static str, channel: &str, mut call: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome = match tokio::time::timeout(self.policy.attempt_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(ChannelError::Timeout {
                    operation,
                    channel: channel.to_string(),
                    after: self.policy.attempt_timeout,
                }),
            };

            match outcome {
                Ok(()) => return Ok(()),
                Err(e) if self.policy.should_retry(attempt) => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        "Channel {} for '{}' failed (attempt {}/{}): {}; retrying in {:?}",
                        operation, channel, attempt, self.policy.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(
                        "Channel {} for '{}' failed after {} attempts: {}",
                        operation, channel, attempt, e
                    );
                    return Err(e);
                }
            }
        }
    }
}
