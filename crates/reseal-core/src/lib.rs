//! Signature reconciliation engine for guardian attestations.
//!
//! This crate provides:
//! - Observation decoding (raw or hex `r || s || v`, recovery-id normalization)
//! - The reconciliation step that rebinds an attestation to the current roster
//! - A typed error taxonomy and a per-call report
//!
//! Core invariants:
//! - The signature count of a reconciled attestation equals the original's
//! - Output signatures are strictly ascending by guardian index
//! - Guardian indexes are always resolved against the target roster
//! - A failed reconciliation never yields partially patched bytes
//! - Identical inputs produce byte-identical output
//!
#![deny(missing_docs)]

/// Error types for reconciliation.
pub mod errors;
/// Observation records and signature decoding.
pub mod observation;
/// The reconciliation engine.
pub mod reconcile;

pub use errors::{DecodeError, ReconcileError};
pub use observation::{decode_signature, Observation, RecoverableSignature};
pub use reconcile::{reconcile, ReconcileReport, Reconciler, Reconciliation};
