//! # swid-channels
//!
//! Messaging channels for Agent entities.
//!
//! ## Responsibilities
//!
//! - Idempotent channel creation on the broker
//! - Publishing the registration announcement
//! - Per-operation retry with exponential backoff and timeouts
//!
//! The broker is injected through [`ChannelBroker`]; [`NatsChannelBroker`]
//! maps channels onto JetStream streams and [`InMemoryChannelBroker`] keeps
//! them in process.

pub mod errors;
pub mod memory;
pub mod nats;
mod provisioner;
pub mod traits;
pub mod types;

pub use errors::{ChannelError, Result};
pub use memory::InMemoryChannelBroker;
pub use nats::{NatsChannelBroker, NatsChannelConfig};
pub use provisioner::ChannelProvisioner;
pub use traits::ChannelBroker;
pub use types::*;
