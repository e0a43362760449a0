//! Inspect command implementation.

use super::CommandResult;
use crate::input::read_vaa;
use crate::output::format_json;
use reseal_canonical::{AttestationCodec, WireCodec};
use serde_json::{json, Value};

pub fn run(vaa: String) -> CommandResult {
    let bytes = read_vaa(&vaa)?;
    let attestation = WireCodec
        .decode(&bytes)
        .map_err(|e| format!("Failed to decode attestation: {}", e))?;

    let mut output = serde_json::to_value(&attestation)?;
    if let Value::Object(map) = &mut output {
        map.insert("digest".into(), json!(attestation.digest().to_string()));
        map.insert("signature_count".into(), json!(attestation.signatures.len()));
        map.insert(
            "canonical_signatures".into(),
            json!(attestation.has_canonical_signatures()),
        );
    }

    println!("{}", format_json(&output));
    Ok(())
}
