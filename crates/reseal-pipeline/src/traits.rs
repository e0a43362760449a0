//! Collaborator seams around the reconciliation engine.

use crate::errors::PipelineError;
use reseal_canonical::{EmitterAddress, GuardianSet, VaaId};
use reseal_core::Observation;
use serde::{Serialize, Serializer};

/// Header fields the on-chain verifier decoded from an attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedHeader {
    /// Envelope version.
    pub version: u8,
    /// Source-chain timestamp.
    pub timestamp: u32,
    /// Emitter nonce.
    pub nonce: u32,
    /// Source chain id.
    pub emitter_chain: u16,
    /// Emitter address.
    pub emitter_address: EmitterAddress,
    /// Emitter sequence.
    pub sequence: u64,
    /// Consistency level.
    pub consistency_level: u8,
    /// Guardian set index the verifier checked against.
    pub guardian_set_index: u32,
    /// Number of signatures the verifier parsed.
    pub signature_count: usize,
    /// Body hash reported by the verifier.
    #[serde(serialize_with = "serialize_prefixed_hex")]
    pub hash: [u8; 32],
}

/// Result of a read-only verifier call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Decoded header.
    pub header: VerifiedHeader,
    /// Whether the attestation verifies.
    pub valid: bool,
    /// Human-readable reason when `valid` is false.
    pub reason: String,
}

/// Maps a source-chain transaction to the attestation ids it emitted.
pub trait ReceiptSource: Send + Sync {
    /// Returns the attestation ids emitted by `tx_hash`.
    fn vaa_ids(&self, tx_hash: &str) -> Result<Vec<VaaId>, PipelineError>;
}

/// Supplies signed attestation bytes.
pub trait AttestationSource: Send + Sync {
    /// Returns the raw signed attestation for `id`.
    fn signed_vaa(&self, id: &VaaId) -> Result<Vec<u8>, PipelineError>;
}

/// Supplies the active guardian roster.
pub trait GuardianSetSource: Send + Sync {
    /// Returns the current guardian set snapshot.
    fn current_guardian_set(&self) -> Result<GuardianSet, PipelineError>;
}

/// Supplies independently gathered guardian signatures.
pub trait ObservationSource: Send + Sync {
    /// Returns every observation collected for `id`, in fetch order.
    fn observations(&self, id: &VaaId) -> Result<Vec<Observation>, PipelineError>;
}

/// Read-only attestation verifier.
pub trait ValidityOracle: Send + Sync {
    /// Parses and verifies `vaa` against the protocol's on-chain rules.
    fn verify(&self, vaa: &[u8]) -> Result<Verdict, PipelineError>;
}

pub(crate) fn serialize_prefixed_hex<S: Serializer, T: AsRef<[u8]>>(
    bytes: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
}
