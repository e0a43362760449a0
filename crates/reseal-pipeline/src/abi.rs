//! Minimal Solidity ABI support for the core contract's verifier call.
//!
//! Only two shapes are needed: calldata for `parseAndVerifyVM(bytes)` and
//! its return value `(Structs.VM vm, bool valid, string reason)`.

use crate::errors::PipelineError;
use crate::traits::{Verdict, VerifiedHeader};
use reseal_canonical::{keccak256, EmitterAddress};

/// Verifier function signature on the core contract.
pub const PARSE_AND_VERIFY_VM: &str = "parseAndVerifyVM(bytes)";

const WORD: usize = 32;

/// Four-byte function selector for a canonical Solidity signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encodes a call to a function taking a single `bytes` argument.
pub fn encode_bytes_call(signature: &str, data: &[u8]) -> Vec<u8> {
    let padded = data.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(4 + 2 * WORD + padded);
    out.extend_from_slice(&selector(signature));
    out.extend_from_slice(&usize_word(WORD));
    out.extend_from_slice(&usize_word(data.len()));
    out.extend_from_slice(data);
    out.resize(4 + 2 * WORD + padded, 0);
    out
}

/// Decodes the return value of `parseAndVerifyVM`.
///
/// VM tuple head layout: version, timestamp, nonce, emitterChainId,
/// emitterAddress, sequence, consistencyLevel, payload offset,
/// guardianSetIndex, signatures offset, hash.
pub fn decode_verify_result(output: &[u8]) -> Result<Verdict, PipelineError> {
    let reader = Reader { data: output };

    let vm = reader.offset(0, 0)?;
    let valid = reader.uint(WORD)? != 0;
    let reason_at = reader.offset(2 * WORD, 0)?;

    let field = |n: usize| vm + n * WORD;
    let signatures_at = reader.offset(field(9), vm)?;

    let header = VerifiedHeader {
        version: reader.narrow(field(0), "version")?,
        timestamp: reader.narrow(field(1), "timestamp")?,
        nonce: reader.narrow(field(2), "nonce")?,
        emitter_chain: reader.narrow(field(3), "emitterChainId")?,
        emitter_address: EmitterAddress::new(reader.word(field(4))?),
        sequence: reader.narrow(field(5), "sequence")?,
        consistency_level: reader.narrow(field(6), "consistencyLevel")?,
        guardian_set_index: reader.narrow(field(8), "guardianSetIndex")?,
        signature_count: reader.narrow(signatures_at, "signatures.length")?,
        hash: reader.word(field(10))?,
    };

    let reason_len: usize = reader.narrow(reason_at, "reason.length")?;
    let reason_bytes = reader.slice(reason_at + WORD, reason_len)?;
    let reason = String::from_utf8_lossy(reason_bytes).into_owned();

    Ok(Verdict {
        header,
        valid,
        reason,
    })
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn slice(&self, at: usize, len: usize) -> Result<&'a [u8], PipelineError> {
        at.checked_add(len)
            .and_then(|end| self.data.get(at..end))
            .ok_or_else(|| {
                PipelineError::InvalidResponse(format!(
                    "ABI data too short: need {} bytes at offset {}, have {}",
                    len,
                    at,
                    self.data.len()
                ))
            })
    }

    fn word(&self, at: usize) -> Result<[u8; WORD], PipelineError> {
        let mut word = [0u8; WORD];
        word.copy_from_slice(self.slice(at, WORD)?);
        Ok(word)
    }

    /// Reads a word as u64; the upper 24 bytes must be zero.
    fn uint(&self, at: usize) -> Result<u64, PipelineError> {
        let word = self.word(at)?;
        if word[..WORD - 8].iter().any(|b| *b != 0) {
            return Err(PipelineError::InvalidResponse(format!(
                "ABI integer at offset {} exceeds 64 bits",
                at
            )));
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&word[WORD - 8..]);
        Ok(u64::from_be_bytes(low))
    }

    fn narrow<T: TryFrom<u64>>(&self, at: usize, field: &str) -> Result<T, PipelineError> {
        let value = self.uint(at)?;
        T::try_from(value).map_err(|_| {
            PipelineError::InvalidResponse(format!("{} value {} out of range", field, value))
        })
    }

    /// Reads a relative offset word and resolves it against `base`.
    fn offset(&self, at: usize, base: usize) -> Result<usize, PipelineError> {
        let relative: usize = self.narrow(at, "offset")?;
        base.checked_add(relative)
            .ok_or_else(|| PipelineError::InvalidResponse("ABI offset overflow".into()))
    }
}
