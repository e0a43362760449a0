use crate::attestation::{Attestation, Signature, ATTESTATION_VERSION};
use crate::identifiers::EmitterAddress;
use thiserror::Error;

/// Envelope header size: version, guardian set index, signature count.
pub const HEADER_SIZE: usize = 1 + 4 + 1;

/// Encoded signature size: guardian index, r, s, recovery id.
pub const SIGNATURE_SIZE: usize = 1 + 32 + 32 + 1;

/// Most signatures a one-byte count can describe.
pub const MAX_SIGNATURES: usize = u8::MAX as usize;

/// Errors raised while decoding or encoding the attestation envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before a field could be read.
    #[error("truncated attestation at offset {offset}: need {needed} more bytes")]
    Truncated {
        /// Byte offset of the field being read.
        offset: usize,
        /// Bytes missing to complete the field.
        needed: usize,
    },
    /// Envelope version is not supported.
    #[error("unsupported attestation version {0}")]
    UnsupportedVersion(u8),
    /// Too many signatures for the one-byte count.
    #[error("{0} signatures exceed the maximum of 255")]
    TooManySignatures(usize),
    /// Signatures are not strictly ascending by guardian index.
    #[error("signatures are not strictly ascending by guardian index")]
    NonCanonicalSignatures,
}

/// Serialize/deserialize capability for the attestation envelope.
pub trait AttestationCodec {
    /// Parses envelope bytes into an attestation.
    fn decode(&self, bytes: &[u8]) -> Result<Attestation, CodecError>;

    /// Encodes an attestation into canonical envelope bytes.
    fn encode(&self, attestation: &Attestation) -> Result<Vec<u8>, CodecError>;
}

/// Big-endian wire codec:
///
/// `version(1) | guardianSetIndex(4) | signatureCount(1) |
/// signatures[guardianIndex(1) r(32) s(32) recoveryId(1)]* |
/// timestamp(4) | nonce(4) | emitterChainId(2) | emitterAddress(32) |
/// sequence(8) | consistencyLevel(1) | payload(rest)`
#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec;

impl AttestationCodec for WireCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Attestation, CodecError> {
        let mut cursor = Cursor::new(bytes);

        let version = cursor.u8()?;
        if version != ATTESTATION_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let guardian_set_index = cursor.u32()?;
        let count = cursor.u8()? as usize;

        let mut signatures = Vec::with_capacity(count);
        for _ in 0..count {
            let guardian_index = cursor.u8()?;
            let r = cursor.array::<32>()?;
            let s = cursor.array::<32>()?;
            let recovery_id = cursor.u8()?;
            signatures.push(Signature {
                guardian_index,
                r,
                s,
                recovery_id,
            });
        }

        let timestamp = cursor.u32()?;
        let nonce = cursor.u32()?;
        let emitter_chain = cursor.u16()?;
        let emitter_address = EmitterAddress::new(cursor.array::<32>()?);
        let sequence = cursor.u64()?;
        let consistency_level = cursor.u8()?;
        let payload = cursor.rest().to_vec();

        Ok(Attestation {
            version,
            guardian_set_index,
            signatures,
            timestamp,
            nonce,
            emitter_chain,
            emitter_address,
            sequence,
            consistency_level,
            payload,
        })
    }

    fn encode(&self, attestation: &Attestation) -> Result<Vec<u8>, CodecError> {
        if attestation.version != ATTESTATION_VERSION {
            return Err(CodecError::UnsupportedVersion(attestation.version));
        }
        let count = attestation.signatures.len();
        if count > MAX_SIGNATURES {
            return Err(CodecError::TooManySignatures(count));
        }
        if !attestation.has_canonical_signatures() {
            return Err(CodecError::NonCanonicalSignatures);
        }

        let body = attestation.body_bytes();
        let mut bytes = Vec::with_capacity(HEADER_SIZE + count * SIGNATURE_SIZE + body.len());
        bytes.push(attestation.version);
        bytes.extend_from_slice(&attestation.guardian_set_index.to_be_bytes());
        bytes.push(count as u8);
        for sig in &attestation.signatures {
            bytes.push(sig.guardian_index);
            bytes.extend_from_slice(&sig.r);
            bytes.extend_from_slice(&sig.s);
            bytes.push(sig.recovery_id);
        }
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.bytes.len() - self.offset;
        if remaining < len {
            return Err(CodecError::Truncated {
                offset: self.offset,
                needed: len - remaining,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.array::<2>()?))
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.array::<4>()?))
    }

    fn u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.array::<8>()?))
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.offset..];
        self.offset = self.bytes.len();
        rest
    }
}
