//! Authentication gate.

use crate::{errors::*, traits::IdentityProvider, types::*};
use std::path::Path;
use swid_channels::ChannelBroker;
use swid_crypto::did_from_private_key_pem;
use swid_storage::Storage;
use tracing::{info, warn};

use super::RegistrationService;

impl<P, B, S> RegistrationService<P, B, S>
where
    P: IdentityProvider + 'static,
    B: ChannelBroker + 'static,
    S: Storage + 'static,
{
    /// Resolve a private key to a registrar login
    pub(crate) async fn login_internal(&self, private_key_pem: &str) -> Result<Caller> {
        let identifier = did_from_private_key_pem(private_key_pem)
            .map_err(|e| AuthorizationError::InvalidKey(e.to_string()))?;

        let record = self
            .store
            .get(&identifier)
            .await?
            .ok_or_else(|| AuthorizationError::UnknownIdentity(identifier.clone()))?;

        if !record.can_register_others() {
            warn!(
                "Login refused for {}: stored type is {}",
                identifier, record.entity_type
            );
            return Err(AuthorizationError::NotRegistrar {
                identifier,
                entity_type: record.entity_type,
            }
            .into());
        }

        info!("Logged in as {} ({})", record.display_name, identifier);
        Ok(Caller::Authenticated(Registrar::from(&record)))
    }

    /// Log in with a private key file
    pub async fn login_with_key_file(&self, path: &Path) -> Result<Caller> {
        let pem = tokio::fs::read_to_string(path)
            .await
            .map(PrivateKeyPem::new)
            .map_err(|e| AuthorizationError::InvalidKey(format!("{}: {}", path.display(), e)))?;
        self.login_internal(pem.expose()).await
    }

    /// Check that `caller` may register an entity of `entity_type`
    ///
    /// A logged-in registrar's record is re-read, so a registrar whose
    /// record changed type since login is refused. Returns the current
    /// registrar, or `None` for a bootstrap registration.
    pub(crate) async fn authorize(
        &self,
        caller: &Caller,
        entity_type: EntityType,
    ) -> Result<Option<Registrar>> {
        match caller {
            Caller::Unauthenticated => {
                if !entity_type.can_register_others() {
                    return Err(AuthorizationError::Unauthenticated(entity_type).into());
                }
                Ok(None)
            }
            Caller::Authenticated(registrar) => {
                let record = self
                    .store
                    .get(&registrar.identifier)
                    .await?
                    .ok_or_else(|| {
                        AuthorizationError::UnknownIdentity(registrar.identifier.clone())
                    })?;

                if !record.can_register_others() {
                    return Err(AuthorizationError::NotRegistrar {
                        identifier: record.identifier,
                        entity_type: record.entity_type,
                    }
                    .into());
                }

                Ok(Some(Registrar::from(&record)))
            }
        }
    }

    /// Check that `registrar` may replace `existing` with an `entity_type`
    ///
    /// Only the identity itself or the registrar that registered it may
    /// re-register an identifier, and a Person or Organization may not
    /// become a type that cannot register others.
    pub(crate) fn authorize_overwrite(
        registrar: Option<&Registrar>,
        existing: &IdentityRecord,
        entity_type: EntityType,
    ) -> Result<()> {
        let Some(registrar) = registrar else {
            return Err(
                AuthorizationError::LoginRequiredForOverwrite(existing.identifier.clone()).into(),
            );
        };

        if registrar.identifier != existing.identifier
            && registrar.identifier != existing.registered_by
        {
            return Err(AuthorizationError::NotOwner {
                caller: registrar.identifier.clone(),
                identifier: existing.identifier.clone(),
            }
            .into());
        }

        if existing.can_register_others() && !entity_type.can_register_others() {
            warn!(
                "Refusing to re-register registrar {} as {}",
                existing.identifier, entity_type
            );
            return Err(AuthorizationError::RegistrarDemotion {
                identifier: existing.identifier.clone(),
                from: existing.entity_type,
                to: entity_type,
            }
            .into());
        }

        Ok(())
    }
}
