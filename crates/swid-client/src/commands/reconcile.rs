/*!
 * Reconciliation journal command
 */

use anyhow::Result;
use colored::*;
use swid_registry_core::Registration;

use crate::state::AppState;

pub async fn list_reports(state: &AppState) -> Result<()> {
    println!("{}", "=== Reconciliation Journal ===".bold().cyan());

    let reports = state.service.reconciliation_reports().await?;
    if reports.is_empty() {
        println!("\n{}", "✓ No partially failed registrations".green());
        return Ok(());
    }

    for report in &reports {
        println!(
            "\n{} {}",
            "Registration".bold(),
            report.registration_id.to_string().bold()
        );
        println!("  SWID: {}", report.identifier);
        println!("  Failed At: {}", report.stage.to_string().red());
        println!("  Reason: {}", report.reason);
        println!("  Recorded At: {}", report.recorded_at);
        println!("  Completed Steps:");
        for step in &report.completed {
            println!("    - {}", step);
        }
    }
    println!(
        "\n{}",
        format!("{} registration(s) need reconciliation", reports.len()).yellow()
    );

    Ok(())
}
