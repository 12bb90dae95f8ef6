//! Error types for channel provisioning.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for channel operations
pub type Result<T> = std::result::Result<T, ChannelError>;

/// Channel subsystem errors
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Broker connection failed
    #[error("Broker connection failed: {0}")]
    Connection(String),

    /// Channel creation failed
    #[error("Failed to create channel '{channel}': {reason}")]
    CreateFailed { channel: String, reason: String },

    /// Publishing to a channel failed
    #[error("Failed to publish to channel '{channel}': {reason}")]
    PublishFailed { channel: String, reason: String },

    /// Channel does not exist on the broker
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// Broker call did not complete in time
    #[error("{operation} on channel '{channel}' timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        channel: String,
        after: Duration,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
