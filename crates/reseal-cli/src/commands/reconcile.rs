//! Offline reconcile command implementation.

use super::CommandResult;
use crate::input::read_vaa;
use crate::output::{format_json, prefixed_hex};
use reseal_pipeline::{observations_from_json, GuardianSetDocument};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub fn run(
    vaa: String,
    guardian_set: PathBuf,
    observations: PathBuf,
    json_output: bool,
) -> CommandResult {
    let original = read_vaa(&vaa)?;

    let roster_text = fs::read_to_string(&guardian_set)
        .map_err(|e| format!("Failed to read {}: {}", guardian_set.display(), e))?;
    let roster = GuardianSetDocument::from_json(&roster_text)
        .map_err(|e| format!("Invalid guardian set: {}", e))?;

    let observations_text = fs::read_to_string(&observations)
        .map_err(|e| format!("Failed to read {}: {}", observations.display(), e))?;
    let observations = observations_from_json(&observations_text)
        .map_err(|e| format!("Invalid observations: {}", e))?;
    info!(
        guardians = roster.len(),
        observations = observations.len(),
        "inputs loaded"
    );

    let result = reseal_core::reconcile(&original, &roster, &observations)?;

    if json_output {
        let output = json!({
            "patched": prefixed_hex(&result.bytes),
            "report": result.report,
        });
        println!("{}", format_json(&output));
    } else {
        println!("{}", prefixed_hex(&result.bytes));
    }
    Ok(())
}
