//! Shared fixtures for registration integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use swid_channels::{InMemoryChannelBroker, RetryPolicy};
use swid_registry_core::{
    Caller, IdentityProvider, MintError, MintedIdentity, NativeIdentityProvider, Registration,
    RegistrationConfig, RegistrationReceipt, RegistrationRequest, RegistrationService,
};
use swid_schema::HSML_CONTEXT_URI;
use swid_storage::RocksDbStorage;
use tempfile::TempDir;

pub type TestService =
    RegistrationService<CountingProvider, InMemoryChannelBroker, RocksDbStorage>;

/// Native provider wrapped with a call counter
#[derive(Default)]
pub struct CountingProvider {
    inner: NativeIdentityProvider,
    calls: AtomicUsize,
}

impl CountingProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for CountingProvider {
    async fn mint(&self) -> Result<MintedIdentity, MintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.mint().await
    }
}

/// Service over a temporary database plus its collaborators
pub struct Harness {
    pub service: Arc<TestService>,
    pub provider: Arc<CountingProvider>,
    pub broker: Arc<InMemoryChannelBroker>,
    pub output: TempDir,
    _db: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let (storage, db) = RocksDbStorage::open_test().expect("open test storage");
        let provider = Arc::new(CountingProvider::default());
        let broker = Arc::new(InMemoryChannelBroker::new());
        let config = RegistrationConfig {
            external_timeout: Duration::from_secs(5),
            channel_retry: RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                attempt_timeout: Duration::from_secs(1),
            },
            ..RegistrationConfig::default()
        };
        let service = Arc::new(RegistrationService::new(
            provider.clone(),
            broker.clone(),
            Arc::new(storage),
            config,
        ));

        Self {
            service,
            provider,
            broker,
            output: tempfile::tempdir().expect("output dir"),
            _db: db,
        }
    }

    pub fn request(&self, document: &Value) -> RegistrationRequest {
        RegistrationRequest::from_value(document, self.output.path())
    }

    pub async fn register(
        &self,
        caller: &Caller,
        document: &Value,
    ) -> swid_registry_core::Result<RegistrationReceipt> {
        self.service.register(caller, self.request(document)).await
    }

    /// Bootstrap a Person and return its receipt and login
    pub async fn bootstrap_person(&self, name: &str) -> (RegistrationReceipt, Caller) {
        let receipt = self
            .register(&Caller::Unauthenticated, &person(name))
            .await
            .expect("bootstrap person");
        let caller = receipt.caller().expect("person can register others");
        (receipt, caller)
    }
}

pub fn person(name: &str) -> Value {
    json!({
        "@context": [HSML_CONTEXT_URI],
        "@type": "Person",
        "name": name,
        "birthDate": "1990-01-01",
        "email": "a@example.com"
    })
}

pub fn organization(name: &str) -> Value {
    json!({
        "@context": [HSML_CONTEXT_URI],
        "@type": "Organization",
        "name": name,
        "description": "Research lab",
        "url": "https://example.org",
        "address": "1 Main St",
        "logo": "https://example.org/logo.png",
        "foundingDate": "2001-05-05",
        "email": "hello@example.org"
    })
}

pub fn agent(name: &str) -> Value {
    json!({
        "@context": [HSML_CONTEXT_URI],
        "@type": "Agent",
        "name": name,
        "creator": "Ada",
        "dateCreated": "2024-01-01",
        "dateModified": "2024-01-02",
        "description": "Autonomous survey agent"
    })
}

pub fn entity(name: &str) -> Value {
    json!({
        "@context": [HSML_CONTEXT_URI],
        "@type": "Entity",
        "name": name,
        "description": "A rover"
    })
}

pub fn credential(name: &str) -> Value {
    json!({
        "@context": [HSML_CONTEXT_URI],
        "@type": "Credential",
        "name": name,
        "description": "Lab access",
        "issuedBy": "did:key:z6MkIssuer",
        "accessAuthorization": "read",
        "authorizedForDomain": "lab"
    })
}
