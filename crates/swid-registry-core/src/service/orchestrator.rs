//! Registration pipeline.
//!
//! validate → authorize → reuse or mint → claim channel → provision and
//! announce → upsert → write artifacts.
//!
//! Failures before the mint leave nothing behind. Later failures return the
//! completed steps, log each one and journal a reconciliation report.

use crate::{errors::*, traits::IdentityProvider, types::*};
use std::future::Future;
use swid_channels::{Announcement, ChannelBroker};
use swid_crypto::public_key_multibase;
use swid_schema::{validate_str, ValidatedDocument};
use swid_storage::Storage;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::RegistrationService;

impl<P, B, S> RegistrationService<P, B, S>
where
    P: IdentityProvider + 'static,
    B: ChannelBroker + 'static,
    S: Storage + 'static,
{
    pub(crate) async fn register_internal(
        &self,
        caller: &Caller,
        request: RegistrationRequest,
    ) -> Result<RegistrationReceipt> {
        let ValidatedDocument {
            mut document,
            warnings: advisories,
        } = validate_str(&request.document)?;

        let entity_type = document.entity_type();
        let display_name = document.name().to_string();
        info!("Registering {} '{}'", entity_type, display_name);

        let registrar = self.authorize(caller, entity_type).await?;

        let existing = match document.identifier() {
            Some(identifier) => self.store.get(identifier).await?,
            None => None,
        };
        match &existing {
            Some(existing) => {
                Self::authorize_overwrite(registrar.as_ref(), existing, entity_type)?
            }
            None => self.ensure_key_path_free(&request, &display_name).await?,
        }

        let registration_id = Uuid::new_v4();
        let mut completed = Vec::new();
        let mut warnings: Vec<RegistrationWarning> = advisories
            .into_iter()
            .map(RegistrationWarning::Schema)
            .collect();

        let (identifier, private_key) = match &existing {
            Some(existing) => {
                info!("Re-registering existing identity {}", existing.identifier);
                completed.push(CompletedStep::ReusedIdentifier {
                    identifier: existing.identifier.clone(),
                });
                (existing.identifier.clone(), None)
            }
            None => {
                let minted = self.mint().await?;
                completed.push(CompletedStep::Minted {
                    identifier: minted.identifier.clone(),
                });
                (minted.identifier, Some(minted.private_key))
            }
        };

        let public_key = public_key_multibase(&identifier)
            .map(str::to_string)
            .unwrap_or_else(|_| identifier.clone());

        let registered_by = match &registrar {
            Some(registrar) => registrar.identifier.clone(),
            None => identifier.clone(),
        };

        document.set_identifier(&identifier);

        let channel_name = if entity_type.requires_channel() {
            let channel = self
                .claim_channel(registration_id, &display_name, &identifier, &mut completed)
                .await?;
            self.provision_channel(&channel, &display_name, &mut completed, &mut warnings)
                .await;
            Some(channel)
        } else {
            None
        };

        let now = current_timestamp();
        let record = IdentityRecord {
            identifier: identifier.clone(),
            public_key,
            document: document.to_json_string(),
            registered_by,
            channel_name,
            entity_type,
            display_name: display_name.clone(),
            registered_at: now,
            updated_at: now,
        };

        let outcome = match self.bounded("store upsert", self.store.upsert(record)).await {
            Ok(outcome) => outcome,
            Err(reason) => {
                return Err(self
                    .partial_failure(
                        registration_id,
                        &identifier,
                        RegistrationStage::Upsert,
                        completed,
                        reason,
                    )
                    .await)
            }
        };
        completed.push(CompletedStep::RecordStored {
            identifier: identifier.clone(),
        });

        if let Some(previous) = &outcome.overwritten {
            warn!(
                "Overwrote existing record {} (previously registered by {})",
                previous.identifier, previous.registered_by
            );
            warnings.push(RegistrationWarning::Overwrote {
                identifier: previous.identifier.clone(),
                previous_registered_by: previous.registered_by.clone(),
                previous_channel: previous.channel_name.clone(),
            });
        }

        let private_key_path = match &private_key {
            Some(key) => {
                let write = self
                    .custodian
                    .write_private_key(&request.output_dir, &display_name, key);
                match self.bounded("private key write", write).await {
                    Ok(path) => {
                        completed.push(CompletedStep::KeyWritten { path: path.clone() });
                        Some(path)
                    }
                    Err(reason) => {
                        return Err(self
                            .partial_failure(
                                registration_id,
                                &identifier,
                                RegistrationStage::WriteArtifacts,
                                completed,
                                reason,
                            )
                            .await)
                    }
                }
            }
            None => None,
        };

        let document_value = document.to_value();
        let write = self
            .custodian
            .write_document(&request.output_dir, &display_name, &document_value);
        let document_path = match self.bounded("document write", write).await {
            Ok(path) => path,
            Err(reason) => {
                return Err(self
                    .partial_failure(
                        registration_id,
                        &identifier,
                        RegistrationStage::WriteArtifacts,
                        completed,
                        reason,
                    )
                    .await)
            }
        };

        info!(
            "Registered {} '{}' as {} ({} warnings)",
            entity_type,
            display_name,
            identifier,
            warnings.len()
        );

        Ok(RegistrationReceipt {
            registration_id,
            identifier,
            record: outcome.record,
            private_key_path,
            document_path,
            warnings,
        })
    }

    /// Refuse a fresh mint whose key file would land on an existing one
    async fn ensure_key_path_free(
        &self,
        request: &RegistrationRequest,
        display_name: &str,
    ) -> Result<()> {
        let path = self
            .custodian
            .private_key_path(&request.output_dir, display_name);
        // Lookup errors are left for the key write to report
        let taken = self
            .bounded("private key lookup", tokio::fs::try_exists(&path))
            .await;
        if !matches!(taken, Ok(true)) {
            return Ok(());
        }

        let reason = format!("{} already holds another identity's key", path.display());
        warn!("Refusing to register '{}': {}", display_name, reason);
        Err(RegistrationError::Persistence {
            stage: RegistrationStage::WriteArtifacts,
            completed: Vec::new(),
            reason,
        })
    }

    /// Mint a fresh identity under the external-call timeout
    async fn mint(&self) -> Result<MintedIdentity> {
        let timeout = self.config.external_timeout;
        let minted = tokio::time::timeout(timeout, self.provider.mint())
            .await
            .map_err(|_| MintError::Timeout(timeout))??;

        // The public key is derived from the identifier, so it must parse
        public_key_multibase(&minted.identifier).map_err(MintError::from)?;

        info!("Minted identity {}", minted.identifier);
        Ok(minted)
    }

    async fn claim_channel(
        &self,
        registration_id: Uuid,
        display_name: &str,
        identifier: &str,
        completed: &mut Vec<CompletedStep>,
    ) -> Result<String> {
        let claim = self.negotiator.claim_channel_name(display_name, identifier);

        match self.bounded("channel claim", claim).await {
            Ok(Some(channel)) => {
                completed.push(CompletedStep::ChannelClaimed {
                    channel: channel.clone(),
                });
                Ok(channel)
            }
            Ok(None) => {
                let attempts = self.negotiator.max_attempts();
                let base = super::base_channel_name(display_name);
                let completed = std::mem::take(completed);
                self.journal(
                    registration_id,
                    identifier,
                    RegistrationStage::ChannelClaim,
                    &completed,
                    format!("no free channel name for '{}' after {} attempts", base, attempts),
                )
                .await;
                Err(RegistrationError::Negotiation {
                    base,
                    attempts,
                    completed,
                })
            }
            Err(reason) => Err(self
                .partial_failure(
                    registration_id,
                    identifier,
                    RegistrationStage::ChannelClaim,
                    std::mem::take(completed),
                    reason,
                )
                .await),
        }
    }

    /// Create the channel and announce the Agent; failures become warnings
    async fn provision_channel(
        &self,
        channel: &str,
        display_name: &str,
        completed: &mut Vec<CompletedStep>,
        warnings: &mut Vec<RegistrationWarning>,
    ) {
        if let Err(e) = self.provisioner.provision(channel).await {
            warn!("Channel '{}' was claimed but not created: {}", channel, e);
            warnings.push(RegistrationWarning::ChannelProvisioningFailed {
                channel: channel.to_string(),
                reason: e.to_string(),
            });
            return;
        }
        completed.push(CompletedStep::ChannelProvisioned {
            channel: channel.to_string(),
        });

        let announcement = Announcement::agent_registered(display_name);
        if let Err(e) = self.provisioner.announce(channel, &announcement).await {
            warn!("Announcement on '{}' failed: {}", channel, e);
            warnings.push(RegistrationWarning::AnnouncementFailed {
                channel: channel.to_string(),
                reason: e.to_string(),
            });
            return;
        }
        completed.push(CompletedStep::Announced {
            channel: channel.to_string(),
        });
    }

    /// Run a store or filesystem call under the external-call timeout
    async fn bounded<T, E, F>(&self, operation: &str, call: F) -> std::result::Result<T, String>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        match tokio::time::timeout(self.config.external_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(format!("{} failed: {}", operation, e)),
            Err(_) => Err(format!(
                "{} timed out after {:?}",
                operation, self.config.external_timeout
            )),
        }
    }

    async fn partial_failure(
        &self,
        registration_id: Uuid,
        identifier: &str,
        stage: RegistrationStage,
        completed: Vec<CompletedStep>,
        reason: String,
    ) -> RegistrationError {
        self.journal(registration_id, identifier, stage, &completed, reason.clone())
            .await;
        RegistrationError::Persistence {
            stage,
            completed,
            reason,
        }
    }

    /// Log every committed side effect and journal the failure
    async fn journal(
        &self,
        registration_id: Uuid,
        identifier: &str,
        stage: RegistrationStage,
        completed: &[CompletedStep],
        reason: String,
    ) {
        error!(
            "Registration {} for {} failed at {}: {}",
            registration_id, identifier, stage, reason
        );
        for step in completed {
            warn!(
                "Registration {} left side effect for reconciliation: {}",
                registration_id, step
            );
        }

        let report = ReconciliationReport {
            registration_id,
            identifier: identifier.to_string(),
            stage,
            completed: completed.to_vec(),
            reason,
            recorded_at: current_timestamp(),
        };

        match self
            .bounded("journal write", self.store.record_reconciliation(&report))
            .await
        {
            Ok(()) => info!("Reconciliation report {} journaled", registration_id),
            Err(reason) => error!(
                "Reconciliation report {} was not journaled: {}",
                registration_id, reason
            ),
        }
    }
}
