use reseal_canonical::CodecError;
use thiserror::Error;

/// Why a single observation's signature material was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Signature material is neither 65 raw bytes nor 130 hex chars.
    #[error("signature must be 65 bytes or 130 hex chars, got {0} bytes")]
    InvalidLength(usize),
    /// Hex-encoded signature material did not decode.
    #[error("invalid hex signature: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// Recovery byte is not reducible to 0 or 1.
    #[error("recovery byte {0} does not reduce to 0 or 1")]
    InvalidRecoveryId(u8),
    /// The attestation being repaired could not be parsed.
    #[error("attestation could not be decoded: {0}")]
    Attestation(CodecError),
}

/// Reconciliation failures. Returned, never panicked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    /// A required input is empty or left no usable observations.
    #[error("invalid input: {0}")]
    Input(String),
    /// Input bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// Not enough fresh signatures to replace the stale ones.
    ///
    /// `original` is the untouched input; no partial patch is produced.
    #[error("quorum error: {stale} stale signatures but only {available} replacements available")]
    Quorum {
        /// Stale signatures removed from the attestation.
        stale: usize,
        /// Replacement candidates that were available.
        available: usize,
        /// Original attestation bytes, unmodified.
        original: Vec<u8>,
    },
    /// Composed signature count differs from the original count.
    #[error("integrity error: expected {expected} signatures, composed {actual}")]
    Integrity {
        /// Signature count of the original attestation.
        expected: usize,
        /// Signature count after composition.
        actual: usize,
    },
    /// Patched attestation could not be re-encoded.
    #[error("serialization error: {0}")]
    Serialization(CodecError),
}

impl ReconcileError {
    /// Original bytes handed back by a quorum failure.
    pub fn original_bytes(&self) -> Option<&[u8]> {
        match self {
            ReconcileError::Quorum { original, .. } => Some(original),
            _ => None,
        }
    }
}
