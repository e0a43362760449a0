use serde::{Serialize, Serializer};
use sha3::{Digest as Sha3Digest, Keccak256};
use std::fmt;

/// Keccak-256 digest of an attestation body.
///
/// Guardians sign `keccak256(keccak256(body))`; the body excludes the
/// version, guardian set index and signature list, so re-signing an
/// attestation never moves its digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Computes the signing digest for encoded body bytes.
    pub fn of_body(body: &[u8]) -> Self {
        Self(keccak256(&keccak256(body)))
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Single Keccak-256 over `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_of_empty_input_matches_known_vector() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn body_digest_is_double_hash() {
        let body = b"body";
        assert_eq!(Digest::of_body(body).as_bytes(), &keccak256(&keccak256(body)));
    }
}
