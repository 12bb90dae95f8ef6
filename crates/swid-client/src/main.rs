/*!
 * SWID Registry Client
 *
 * Registers HSML entities under did:key identifiers:
 * 1. Bootstrap a Person or Organization without an identity
 * 2. Log in with its private key to register Agents, Credentials and Entities
 * 3. Inspect stored records and partially failed registrations
 *
 * Usage:
 *   swid register ada.json
 *   swid register scout.json --login registered/Ada_private_key.pem
 *   swid whoami registered/Ada_private_key.pem
 *   swid show did:key:z6Mk...
 *   swid registered-by did:key:z6Mk...
 *   swid reconcile
 */

mod commands;
mod config;
mod state;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use state::AppState;

/// Filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str =
    "swid=info,swid_registry_core=info,swid_schema=info,swid_channels=info,swid_storage=info";

// CLI structure
#[derive(Parser)]
#[command(name = "swid")]
#[command(about = "Register HSML entities in the SWID registry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an entity document
    Register {
        /// Path to the JSON document
        document: PathBuf,

        /// Private key of the registering Person or Organization
        #[arg(short, long)]
        login: Option<PathBuf>,

        /// Directory for the private key and document files
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the identity behind a private key
    Whoami {
        /// Path to a private key PEM
        key: PathBuf,
    },
    /// Show a stored record
    Show {
        /// did:key identifier
        identifier: String,
    },
    /// List records registered by an identity
    RegisteredBy {
        /// did:key identifier of the registrar
        identifier: String,
    },
    /// List registrations that failed after side effects
    Reconcile,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    let state = AppState::new(config).await?;

    match cli.command {
        Commands::Register {
            document,
            login,
            output,
        } => commands::register::register(&state, &document, login.as_deref(), output).await?,

        Commands::Whoami { key } => commands::show::whoami(&state, &key).await?,

        Commands::Show { identifier } => commands::show::show_record(&state, &identifier).await?,

        Commands::RegisteredBy { identifier } => {
            commands::show::registered_by(&state, &identifier).await?
        }

        Commands::Reconcile => commands::reconcile::list_reports(&state).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_default_filter_covers_library_crates() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
        for target in ["swid_registry_core", "swid_schema", "swid_channels"] {
            assert!(
                DEFAULT_LOG_FILTER
                    .split(',')
                    .any(|directive| directive == format!("{}=info", target)),
                "{} missing from default filter",
                target
            );
        }
    }
}
