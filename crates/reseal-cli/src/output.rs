//! Output formatting utilities.

use reseal_pipeline::{BatchReport, BatchSummary, VaaOutcome};
use serde::Serialize;

/// Formats any serializable value as pretty JSON.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// `0x`-prefixed lowercase hex.
pub fn prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!("{:<20} {:<40} {:<14} {}", "TX", "VAA", "STATUS", "DETAIL");
    println!("{}", "-".repeat(100));
}

/// Prints one row per attestation, or one row for a failed receipt.
pub fn print_batch_rows(batch: &BatchReport) {
    for tx in &batch.transactions {
        let tx_col = truncate(&tx.tx, 20);
        if let Some(err) = &tx.error {
            println!("{:<20} {:<40} {:<14} {}", tx_col, "-", "RECEIPT_FAILED", err);
            continue;
        }
        if tx.vaas.is_empty() {
            println!("{:<20} {:<40} {:<14} {}", tx_col, "-", "NO_VAAS", "");
        }
        for vaa in &tx.vaas {
            let (status, detail) = match &vaa.outcome {
                VaaOutcome::AlreadyValid => ("VALID", String::new()),
                VaaOutcome::Repaired {
                    patched, verdict, ..
                } if verdict.valid => ("REPAIRED", prefixed_hex(patched)),
                VaaOutcome::Repaired { verdict, .. } => ("REJECTED", verdict.reason.clone()),
                VaaOutcome::Failed { stage, error } => ("FAILED", format!("{}: {}", stage, error)),
            };
            println!(
                "{:<20} {:<40} {:<14} {}",
                tx_col,
                truncate(&vaa.id.to_string(), 40),
                status,
                detail
            );
        }
    }
}

/// Prints the outcome counts.
pub fn print_summary(summary: &BatchSummary) {
    println!(
        "\n{} transaction(s): {} valid, {} repaired, {} rejected, {} failed, {} receipt failure(s)",
        summary.transactions,
        summary.already_valid,
        summary.repaired,
        summary.rejected,
        summary.failed,
        summary.failed_transactions
    );
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
