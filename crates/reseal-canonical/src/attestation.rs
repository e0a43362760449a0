use crate::digest::Digest;
use crate::identifiers::EmitterAddress;
use serde::{Serialize, Serializer};

/// The only attestation envelope version in circulation.
pub const ATTESTATION_VERSION: u8 = 1;

/// One guardian signature inside an attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Signature {
    /// Position of the signer in the guardian set named by the attestation.
    pub guardian_index: u8,
    /// Big-endian bytes of the 256-bit `r` scalar.
    #[serde(serialize_with = "serialize_hex")]
    pub r: [u8; 32],
    /// Big-endian bytes of the 256-bit `s` scalar.
    #[serde(serialize_with = "serialize_hex")]
    pub s: [u8; 32],
    /// ECDSA recovery id, 0 or 1.
    pub recovery_id: u8,
}

/// A signed cross-chain attestation (VAA).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attestation {
    /// Envelope version.
    pub version: u8,
    /// Guardian set epoch the signatures claim to satisfy.
    pub guardian_set_index: u32,
    /// Signatures, ascending by guardian index in canonical form.
    pub signatures: Vec<Signature>,
    /// Source-chain time of the observed event (unix seconds).
    pub timestamp: u32,
    /// Emitter-chosen nonce.
    pub nonce: u32,
    /// Source chain id.
    pub emitter_chain: u16,
    /// Emitter address on the source chain.
    pub emitter_address: EmitterAddress,
    /// Emitter sequence number.
    pub sequence: u64,
    /// Finality level requested by the emitter.
    pub consistency_level: u8,
    /// Opaque application payload.
    #[serde(serialize_with = "serialize_hex")]
    pub payload: Vec<u8>,
}

impl Attestation {
    /// Size of the fixed body prefix that precedes the payload.
    pub const BODY_HEADER_SIZE: usize = 4 + 4 + 2 + 32 + 8 + 1;

    /// Encodes the signed body: everything after the signature list.
    pub fn body_bytes(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::BODY_HEADER_SIZE + self.payload.len());
        body.extend_from_slice(&self.timestamp.to_be_bytes());
        body.extend_from_slice(&self.nonce.to_be_bytes());
        body.extend_from_slice(&self.emitter_chain.to_be_bytes());
        body.extend_from_slice(self.emitter_address.as_bytes());
        body.extend_from_slice(&self.sequence.to_be_bytes());
        body.push(self.consistency_level);
        body.extend_from_slice(&self.payload);
        body
    }

    /// Digest the guardians sign. Independent of the signature list.
    pub fn digest(&self) -> Digest {
        Digest::of_body(&self.body_bytes())
    }

    /// Returns true when guardian indexes are strictly ascending.
    pub fn has_canonical_signatures(&self) -> bool {
        self.signatures
            .windows(2)
            .all(|pair| pair[0].guardian_index < pair[1].guardian_index)
    }
}

fn serialize_hex<S: Serializer, T: AsRef<[u8]>>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}
