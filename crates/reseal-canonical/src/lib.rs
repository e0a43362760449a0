//! Canonical data model for guardian-signed attestations (VAAs).
//!
//! Holds the attestation envelope, guardian rosters, identifiers, the
//! body digest and the canonical wire codec. Every byte that ends up in a
//! re-signed attestation is produced by this crate.
//!
#![deny(missing_docs)]

/// Attestation and signature types.
pub mod attestation;
/// Canonical wire codec for the attestation envelope.
pub mod codec;
/// Body digest (double Keccak-256).
pub mod digest;
/// Guardian roster snapshot.
pub mod guardian_set;
/// Addresses and attestation identifiers.
pub mod identifiers;
/// Validation helpers used by canonical types.
pub mod validation;

pub use attestation::{Attestation, Signature, ATTESTATION_VERSION};
pub use codec::{AttestationCodec, CodecError, WireCodec};
pub use digest::{keccak256, Digest};
pub use guardian_set::{GuardianSet, MAX_GUARDIANS};
pub use identifiers::{EmitterAddress, GuardianAddress, VaaId};
pub use validation::ValidationError;
