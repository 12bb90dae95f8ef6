use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use swid_registry_core::{RegistrationConfig, RetryPolicy};

/// Default arguments passed to the external key tool
pub const DEFAULT_KEY_TOOL_ARGS: &str = "--export-private";

/// External key tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyToolConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to RocksDB database
    pub database_path: PathBuf,

    /// Directory receiving key and document files
    pub output_dir: PathBuf,

    /// NATS server; the in-memory broker is used when unset
    pub nats_url: Option<String>,

    /// External key tool; identities are minted in process when unset
    pub key_tool: Option<KeyToolConfig>,

    /// Upper bound for every external call
    pub external_timeout: Duration,

    /// Candidate channel names tried per Agent
    pub channel_claim_attempts: u32,

    /// Attempts per channel create or publish
    pub channel_retry_attempts: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = var("SWID_DATABASE_PATH")
            .unwrap_or_else(|| "./data/swid-registry.db".to_string())
            .into();

        let output_dir = var("SWID_OUTPUT_DIR")
            .unwrap_or_else(|| "./registered".to_string())
            .into();

        let nats_url = var("SWID_NATS_URL").filter(|url| !url.trim().is_empty());

        let key_tool = var("SWID_KEY_TOOL")
            .filter(|program| !program.trim().is_empty())
            .map(|program| KeyToolConfig {
                program: program.into(),
                args: var("SWID_KEY_TOOL_ARGS")
                    .unwrap_or_else(|| DEFAULT_KEY_TOOL_ARGS.to_string())
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
                working_dir: var("SWID_KEY_TOOL_DIR")
                    .unwrap_or_else(|| ".".to_string())
                    .into(),
            });

        let external_timeout = Duration::from_secs(
            var("SWID_EXTERNAL_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("SWID_EXTERNAL_TIMEOUT_SECS must be a number of seconds")?,
        );

        let channel_claim_attempts = var("SWID_CHANNEL_CLAIM_ATTEMPTS")
            .unwrap_or_else(|| "16".to_string())
            .parse()
            .context("SWID_CHANNEL_CLAIM_ATTEMPTS must be a positive integer")?;

        let channel_retry_attempts = var("SWID_CHANNEL_RETRY_ATTEMPTS")
            .unwrap_or_else(|| "3".to_string())
            .parse()
            .context("SWID_CHANNEL_RETRY_ATTEMPTS must be a positive integer")?;

        if channel_claim_attempts == 0 || channel_retry_attempts == 0 {
            anyhow::bail!("Channel attempt budgets must be at least 1");
        }

        Ok(Config {
            database_path,
            output_dir,
            nats_url,
            key_tool,
            external_timeout,
            channel_claim_attempts,
            channel_retry_attempts,
        })
    }

    /// Tunables for the registration service
    pub fn registration(&self) -> RegistrationConfig {
        RegistrationConfig {
            external_timeout: self.external_timeout,
            channel_claim_attempts: self.channel_claim_attempts,
            channel_retry: RetryPolicy {
                max_attempts: self.channel_retry_attempts,
                attempt_timeout: self.external_timeout,
                ..RetryPolicy::default()
            },
        }
    }
}
