//! Registry store: identity records, channel claims and the saga journal.

use crate::types::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use swid_storage::{
    BatchExt, Result, Storage, CF_CHANNEL_CLAIMS, CF_ENTITY_RECORDS, CF_RECORDS_BY_REGISTRAR,
    CF_REGISTRATION_JOURNAL,
};
use tokio::sync::Mutex;
use tracing::debug;

const LOCK_STRIPES: usize = 64;

/// Result of an upsert
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    /// The record as stored
    pub record: IdentityRecord,
    /// The record it replaced, if any
    pub overwritten: Option<IdentityRecord>,
}

/// Typed access to the registry column families
///
/// Upserts for one identifier are serialized through a striped lock, so they
/// apply in the order they acquire it; different identifiers rarely share a
/// stripe.
pub struct RegistryStore<S: Storage> {
    storage: Arc<S>,
    stripes: Vec<Mutex<()>>,
}

impl<S: Storage> RegistryStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            stripes: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    fn stripe(&self, identifier: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        identifier.hash(&mut hasher);
        &self.stripes[(hasher.finish() as usize) % self.stripes.len()]
    }

    /// Insert or replace a record by identifier
    ///
    /// On replace the original `registered_at` is kept and the registrar
    /// index follows the new registrar.
    pub async fn upsert(&self, mut record: IdentityRecord) -> Result<UpsertOutcome> {
        let _guard = self.stripe(&record.identifier).lock().await;

        let previous: Option<IdentityRecord> = self
            .storage
            .get(CF_ENTITY_RECORDS, &record.identifier)
            .await?;

        let mut batch = self.storage.batch();

        if let Some(prev) = &previous {
            record.registered_at = prev.registered_at;
            if prev.registered_by != record.registered_by {
                batch.delete(
                    CF_RECORDS_BY_REGISTRAR,
                    &(prev.registered_by.as_str(), prev.identifier.as_str()),
                )?;
            }
        }

        batch.put(CF_ENTITY_RECORDS, &record.identifier, &record)?;
        batch.put(
            CF_RECORDS_BY_REGISTRAR,
            &(record.registered_by.as_str(), record.identifier.as_str()),
            &record.identifier,
        )?;
        batch.commit().await?;

        debug!(
            "Upserted record {} (overwrite: {})",
            record.identifier,
            previous.is_some()
        );

        Ok(UpsertOutcome {
            record,
            overwritten: previous,
        })
    }

    /// Get a record by identifier
    pub async fn get(&self, identifier: &str) -> Result<Option<IdentityRecord>> {
        self.storage.get(CF_ENTITY_RECORDS, &identifier).await
    }

    /// Whether a record exists for the identifier
    pub async fn exists(&self, identifier: &str) -> Result<bool> {
        self.storage.exists(CF_ENTITY_RECORDS, &identifier).await
    }

    /// Whether a channel name has ever been claimed
    pub async fn channel_name_taken(&self, name: &str) -> Result<bool> {
        self.storage.exists(CF_CHANNEL_CLAIMS, &name).await
    }

    /// Atomically claim a channel name for an identifier
    ///
    /// Returns `false` when the name is already claimed. Claims are never
    /// released.
    pub async fn claim_channel_name(&self, name: &str, identifier: &str) -> Result<bool> {
        self.storage
            .put_if_absent(CF_CHANNEL_CLAIMS, &name, &identifier)
            .await
    }

    /// Identifier that claimed a channel name
    pub async fn channel_claimant(&self, name: &str) -> Result<Option<String>> {
        self.storage.get(CF_CHANNEL_CLAIMS, &name).await
    }

    /// Records credited to a registrar, in identifier order
    pub async fn records_registered_by(&self, registrar: &str) -> Result<Vec<IdentityRecord>> {
        let index: Vec<(Vec<u8>, String)> = self
            .storage
            .get_by_prefix(CF_RECORDS_BY_REGISTRAR, &registrar)
            .await?;

        let mut records = Vec::with_capacity(index.len());
        for (_, identifier) in index {
            if let Some(record) = self.get(&identifier).await? {
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Journal a partial failure
    pub async fn record_reconciliation(&self, report: &ReconciliationReport) -> Result<()> {
        self.storage
            .put(CF_REGISTRATION_JOURNAL, &report.registration_id, report)
            .await
    }

    /// Every journaled partial failure, oldest first
    pub async fn reconciliation_reports(&self) -> Result<Vec<ReconciliationReport>> {
        let mut reports: Vec<ReconciliationReport> = self
            .storage
            .scan_all(CF_REGISTRATION_JOURNAL)
            .await?
            .into_iter()
            .map(|(_, report)| report)
            .collect();
        reports.sort_by_key(|r: &ReconciliationReport| r.recorded_at);
        Ok(reports)
    }
}
