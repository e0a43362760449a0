//! Independently collected guardian signatures and their decoding.

use crate::errors::DecodeError;
use reseal_canonical::{GuardianAddress, Signature};
use std::borrow::Cow;

/// Raw `r || s || v` length.
pub const SIGNATURE_LEN: usize = 65;

/// ASCII-hex rendering of a raw signature.
pub const HEX_SIGNATURE_LEN: usize = SIGNATURE_LEN * 2;

/// Offset Ethereum-style recovery bytes carry above the raw recovery id.
const RECOVERY_OFFSET: u8 = 27;

/// A guardian signature over an attestation digest, sourced outside the
/// attestation itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Signer address.
    pub guardian_address: GuardianAddress,
    /// Signature material, raw (65 bytes) or ASCII hex (130 chars).
    pub signature: Vec<u8>,
}

impl Observation {
    /// Creates an observation from its parts.
    pub fn new(guardian_address: GuardianAddress, signature: impl Into<Vec<u8>>) -> Self {
        Self {
            guardian_address,
            signature: signature.into(),
        }
    }
}

/// Decoded and normalized signature, not yet bound to a roster position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    /// Big-endian `r`.
    pub r: [u8; 32],
    /// Big-endian `s`.
    pub s: [u8; 32],
    /// Recovery id, always 0 or 1.
    pub recovery_id: u8,
}

impl RecoverableSignature {
    /// Binds the signature to a guardian index in the target roster.
    pub fn at_index(self, guardian_index: u8) -> Signature {
        Signature {
            guardian_index,
            r: self.r,
            s: self.s,
            recovery_id: self.recovery_id,
        }
    }
}

/// Decodes observation signature material into `(r, s, recovery_id)`.
///
/// Accepts 65 raw bytes, or 130 ASCII hex chars (optionally `0x`-prefixed)
/// encoding the same 65 bytes. A recovery byte of 27 or 28 is reduced to
/// 0 or 1; anything that does not land in {0, 1} is rejected.
pub fn decode_signature(raw: &[u8]) -> Result<RecoverableSignature, DecodeError> {
    let bytes: Cow<'_, [u8]> = match raw.len() {
        SIGNATURE_LEN => Cow::Borrowed(raw),
        HEX_SIGNATURE_LEN => Cow::Owned(hex::decode(raw)?),
        len if len == HEX_SIGNATURE_LEN + 2 && raw.starts_with(b"0x") => {
            Cow::Owned(hex::decode(&raw[2..])?)
        }
        len => return Err(DecodeError::InvalidLength(len)),
    };
    if bytes.len() != SIGNATURE_LEN {
        return Err(DecodeError::InvalidLength(bytes.len()));
    }

    let v = bytes[64];
    let recovery_id = if v >= RECOVERY_OFFSET {
        v - RECOVERY_OFFSET
    } else {
        v
    };
    if recovery_id > 1 {
        return Err(DecodeError::InvalidRecoveryId(v));
    }

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..64]);
    Ok(RecoverableSignature { r, s, recovery_id })
}
