//! Channel name negotiation.

use super::store::RegistryStore;
use rand::Rng;
use std::sync::Arc;
use swid_storage::{Result, Storage};
use tracing::debug;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 6;

/// Base channel name for a display name
///
/// Lower-cased, spaces become `_`, and anything outside `[a-z0-9_-]`
/// becomes `_`.
pub fn base_channel_name(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Claims collision-free channel names in the registry store
pub struct UniquenessNegotiator<S: Storage> {
    store: Arc<RegistryStore<S>>,
    max_attempts: u32,
    suffix: fn() -> String,
}

impl<S: Storage> UniquenessNegotiator<S> {
    pub fn new(store: Arc<RegistryStore<S>>, max_attempts: u32) -> Self {
        Self::with_suffix_source(store, max_attempts, random_suffix)
    }

    /// Draw suffixes from `suffix` instead of the thread RNG
    pub fn with_suffix_source(
        store: Arc<RegistryStore<S>>,
        max_attempts: u32,
        suffix: fn() -> String,
    ) -> Self {
        Self {
            store,
            max_attempts,
            suffix,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Claim `{base}_{suffix}` for `identifier`
    ///
    /// Returns `Ok(None)` when every attempt collided.
    pub async fn claim_channel_name(
        &self,
        display_name: &str,
        identifier: &str,
    ) -> Result<Option<String>> {
        let base = base_channel_name(display_name);

        for attempt in 1..=self.max_attempts {
            let candidate = format!("{}_{}", base, (self.suffix)());

            if self.store.claim_channel_name(&candidate, identifier).await? {
                debug!(
                    "Claimed channel '{}' for {} (attempt {})",
                    candidate, identifier, attempt
                );
                return Ok(Some(candidate));
            }

            debug!("Channel name '{}' taken, drawing a new suffix", candidate);
        }

        Ok(None)
    }
}
