//! Integration tests for CLI commands.

use reseal_canonical::{
    Attestation, AttestationCodec, EmitterAddress, GuardianAddress, Signature, WireCodec,
};
use serde_json::{json, Value};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn guardian(index: u8) -> GuardianAddress {
    GuardianAddress::new([index + 1; 20])
}

fn make_vaa(signers: &[u8]) -> Vec<u8> {
    let attestation = Attestation {
        version: 1,
        guardian_set_index: 4,
        signatures: signers
            .iter()
            .map(|&i| Signature {
                guardian_index: i,
                r: [0xa0 ^ i; 32],
                s: [0xb0 ^ i; 32],
                recovery_id: 1,
            })
            .collect(),
        timestamp: 1_717_000_000,
        nonce: 7,
        emitter_chain: 2,
        emitter_address: EmitterAddress::new([0x3e; 32]),
        sequence: 164_170,
        consistency_level: 1,
        payload: b"transfer".to_vec(),
    };
    WireCodec.encode(&attestation).unwrap()
}

fn observation(index: u8) -> Value {
    let mut sig = vec![0xc0 ^ index; 64];
    sig.push(28);
    json!({
        "guardianAddr": guardian(index).to_string(),
        "signature": format!("0x{}", hex::encode(sig)),
    })
}

/// Writes a roster of six guardians at index 5 and the given observations.
fn write_inputs(observed: &[u8]) -> (TempDir, String, String) {
    let temp_dir = TempDir::new().unwrap();
    let roster = json!({
        "guardianSet": {
            "index": 5,
            "addresses": (0..6).map(|i| guardian(i).to_string()).collect::<Vec<_>>(),
        }
    });
    let observations: Vec<Value> = observed.iter().copied().map(observation).collect();

    let roster_path = temp_dir.path().join("guardian_set.json");
    let observations_path = temp_dir.path().join("observations.json");
    fs::write(&roster_path, roster.to_string()).unwrap();
    fs::write(&observations_path, Value::from(observations).to_string()).unwrap();

    (
        temp_dir,
        roster_path.to_string_lossy().to_string(),
        observations_path.to_string_lossy().to_string(),
    )
}

fn run_cli(args: &[&str]) -> (bool, String, String) {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "reseal", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    let success = output.status.success();

    (success, stdout, stderr)
}

#[test]
fn test_inspect_hex_literal() {
    let vaa = format!("0x{}", hex::encode(make_vaa(&[0, 1, 2])));
    let (success, stdout, _) = run_cli(&["inspect", &vaa]);
    assert!(success);

    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["guardian_set_index"], 4);
    assert_eq!(parsed["sequence"], 164_170);
    assert_eq!(parsed["signature_count"], 3);
    assert_eq!(parsed["canonical_signatures"], true);
    assert!(parsed["digest"].as_str().unwrap().starts_with("0x"));
}

#[test]
fn test_inspect_rejects_truncated_input() {
    let vaa = hex::encode(&make_vaa(&[0])[..20]);
    let (success, _, stderr) = run_cli(&["inspect", &vaa]);
    assert!(!success);
    assert!(stderr.contains("Error"));
}

#[test]
fn test_reconcile_prints_patched_hex() {
    let (temp_dir, roster, observations) = write_inputs(&[0, 1, 5, 4]);
    let vaa_path = temp_dir.path().join("vaa.hex");
    fs::write(&vaa_path, hex::encode(make_vaa(&[0, 1, 2, 3]))).unwrap();

    let (success, stdout, stderr) = run_cli(&[
        "reconcile",
        "--vaa",
        vaa_path.to_str().unwrap(),
        "--guardian-set",
        &roster,
        "--observations",
        &observations,
    ]);
    assert!(success, "{}", stderr);

    let patched = hex::decode(stdout.trim().trim_start_matches("0x")).unwrap();
    let decoded = WireCodec.decode(&patched).unwrap();
    assert_eq!(decoded.guardian_set_index, 5);
    let indexes: Vec<u8> = decoded.signatures.iter().map(|s| s.guardian_index).collect();
    assert_eq!(indexes, vec![0, 1, 4, 5]);
}

#[test]
fn test_reconcile_json_includes_report() {
    let (_temp_dir, roster, observations) = write_inputs(&[0, 1, 2, 3]);
    let vaa = hex::encode(make_vaa(&[0, 1, 2, 3]));

    let (success, stdout, _) = run_cli(&[
        "reconcile",
        "--vaa",
        &vaa,
        "--guardian-set",
        &roster,
        "--observations",
        &observations,
        "--json",
    ]);
    assert!(success);

    let parsed: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["report"]["previous_guardian_set_index"], 4);
    assert_eq!(parsed["report"]["guardian_set_index"], 5);
    assert_eq!(parsed["report"]["stale"], json!([]));
    assert!(parsed["patched"].as_str().unwrap().starts_with("0x01"));
}

#[test]
fn test_reconcile_quorum_failure_exits_nonzero() {
    let (_temp_dir, roster, observations) = write_inputs(&[0]);
    let vaa = hex::encode(make_vaa(&[0, 1, 2, 3]));

    let (success, stdout, stderr) = run_cli(&[
        "reconcile",
        "--vaa",
        &vaa,
        "--guardian-set",
        &roster,
        "--observations",
        &observations,
    ]);
    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("quorum error"), "{}", stderr);
}

#[test]
fn test_missing_config_file_is_reported() {
    let (success, _, stderr) = run_cli(&["--config", "/nonexistent/reseal.json", "inspect", "00"]);
    assert!(!success);
    assert!(stderr.contains("Failed to load config"));
}
