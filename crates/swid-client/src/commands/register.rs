/*!
 * Entity registration command
 */

use anyhow::{Context, Result};
use colored::*;
use std::path::{Path, PathBuf};
use swid_registry_core::{
    Caller, Registration, RegistrationError, RegistrationReceipt, RegistrationRequest,
};

use crate::state::AppState;

pub async fn register(
    state: &AppState,
    document: &Path,
    login: Option<&Path>,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("{}", "=== Registering Entity ===".bold().cyan());

    let caller = authenticate(state, login).await?;

    let contents = tokio::fs::read_to_string(document)
        .await
        .with_context(|| format!("Failed to read {}", document.display()))?;
    let output_dir = output.unwrap_or_else(|| state.config.output_dir.clone());

    match state
        .service
        .register(&caller, RegistrationRequest::new(contents, output_dir))
        .await
    {
        Ok(receipt) => {
            print_receipt(&receipt);
            Ok(())
        }
        Err(e) => {
            print_failure(&e);
            Err(e.into())
        }
    }
}

async fn authenticate(state: &AppState, login: Option<&Path>) -> Result<Caller> {
    let Some(key) = login else {
        println!(
            "{}",
            "No login given: only a Person or Organization can be registered".yellow()
        );
        return Ok(Caller::Unauthenticated);
    };

    let caller = state.service.login_with_key_file(key).await?;
    if let Caller::Authenticated(registrar) = &caller {
        println!(
            "{} Logged in as {} ({})",
            "✓".green(),
            registrar.display_name.bold(),
            registrar.identifier
        );
    }
    Ok(caller)
}

fn print_receipt(receipt: &RegistrationReceipt) {
    println!("\n{}", "✓ Registration complete".green().bold());
    println!("  Registration ID: {}", receipt.registration_id);
    println!("  SWID: {}", receipt.identifier.bold());
    println!("  Type: {}", receipt.record.entity_type);
    println!("  Name: {}", receipt.record.display_name);
    println!("  Registered By: {}", receipt.record.registered_by);
    if let Some(channel) = &receipt.record.channel_name {
        println!("  Channel: {}", channel.cyan());
    }
    match &receipt.private_key_path {
        Some(path) => println!("  Private Key: {}", path.display()),
        None => println!("  Private Key: {}", "unchanged (existing identity)".dimmed()),
    }
    println!("  Document: {}", receipt.document_path.display());

    if !receipt.warnings.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for warning in &receipt.warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }

    if receipt.private_key_path.is_some() {
        println!(
            "\n{}",
            "Keep the private key safe: it is the only way to log in as this identity."
                .yellow()
        );
    }
}

fn print_failure(error: &RegistrationError) {
    println!(
        "\n{} {} [{}]",
        "✗".red().bold(),
        error.to_string().red(),
        error.reason_code()
    );

    let completed = error.completed_steps();
    if !completed.is_empty() {
        println!(
            "\n{}",
            "Side effects left for reconciliation:".yellow().bold()
        );
        for step in completed {
            println!("  - {}", step);
        }
        println!("  Run `swid reconcile` to review journaled failures.");
    }
}
