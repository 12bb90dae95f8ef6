/*!
 * Record inspection commands
 */

use anyhow::{anyhow, Result};
use colored::*;
use std::path::Path;
use swid_registry_core::{Caller, IdentityRecord, Registration};

use crate::state::AppState;

pub async fn whoami(state: &AppState, key: &Path) -> Result<()> {
    println!("{}", "=== Identity ===".bold().cyan());

    let caller = state.service.login_with_key_file(key).await?;
    let Caller::Authenticated(registrar) = caller else {
        return Err(anyhow!("Key does not belong to a registrar"));
    };

    let record = state
        .service
        .get_record(&registrar.identifier)
        .await?
        .ok_or_else(|| anyhow!("No record for {}", registrar.identifier))?;
    print_record(&record);

    Ok(())
}

pub async fn show_record(state: &AppState, identifier: &str) -> Result<()> {
    println!("{}", "=== Record ===".bold().cyan());

    match state.service.get_record(identifier).await? {
        Some(record) => {
            print_record(&record);
            print_document(&record)?;
        }
        None => println!("\n{}", format!("No record for {}", identifier).yellow()),
    }

    Ok(())
}

pub async fn registered_by(state: &AppState, identifier: &str) -> Result<()> {
    println!("{}", "=== Registered Entities ===".bold().cyan());

    let records = state.service.records_registered_by(identifier).await?;
    if records.is_empty() {
        println!(
            "\n{}",
            format!("Nothing registered by {}", identifier).yellow()
        );
        return Ok(());
    }

    println!("\nRegistrar: {}", identifier);
    for record in &records {
        let channel = record
            .channel_name
            .as_deref()
            .map(|c| format!(" channel={}", c))
            .unwrap_or_default();
        println!(
            "  {} {} [{}]{}",
            "•".cyan(),
            record.display_name.bold(),
            record.entity_type,
            channel.dimmed()
        );
        println!("    {}", record.identifier);
    }
    println!("\n{} {} record(s)", "✓".green(), records.len());

    Ok(())
}

fn print_record(record: &IdentityRecord) {
    println!("\n{}", "Record:".bold());
    println!("  SWID: {}", record.identifier);
    println!("  Public Key: {}", record.public_key);
    println!("  Type: {}", record.entity_type);
    println!("  Name: {}", record.display_name);
    if record.is_self_registered() {
        println!("  Registered By: {}", "self".cyan());
    } else {
        println!("  Registered By: {}", record.registered_by);
    }
    if let Some(channel) = &record.channel_name {
        println!("  Channel: {}", channel);
    }
    println!("  Registered At: {}", record.registered_at);
    println!("  Updated At: {}", record.updated_at);
}

fn print_document(record: &IdentityRecord) -> Result<()> {
    let document = record.document_value()?;
    println!("\n{}", "Document:".bold());
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
