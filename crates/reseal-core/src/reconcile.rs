//! Signature reconciliation against the current guardian roster.

use crate::errors::{DecodeError, ReconcileError};
use crate::observation::{decode_signature, Observation};
use reseal_canonical::{Attestation, AttestationCodec, GuardianSet, Signature, WireCodec};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Guardian set index claimed by the original attestation.
    pub previous_guardian_set_index: u32,
    /// Guardian set index stamped on the patched attestation.
    pub guardian_set_index: u32,
    /// Signatures the target roster needs for protocol quorum.
    pub quorum: usize,
    /// Guardian indexes kept from the original signature list.
    pub retained: Vec<u8>,
    /// Guardian indexes removed because no fresh observation confirmed them.
    pub stale: Vec<u8>,
    /// Guardian indexes whose fresh signatures filled the stale slots.
    pub replacements: Vec<u8>,
    /// Observations whose signer is not in the target roster.
    pub off_roster: usize,
    /// Observations with undecodable signature material.
    pub malformed: usize,
    /// Observations dropped because their guardian was already seen.
    pub duplicates: usize,
}

/// Patched attestation bytes and the report describing the patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Canonical encoding of the patched attestation.
    pub bytes: Vec<u8>,
    /// Summary of retained, stale and replacement signatures.
    pub report: ReconcileReport,
}

/// Rebuilds an attestation's signature set against a target roster.
///
/// Pure and synchronous: no I/O and no shared state, so one instance can
/// serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct Reconciler<C = WireCodec> {
    codec: C,
}

impl<C: AttestationCodec> Reconciler<C> {
    /// Creates a reconciler that uses `codec` for the envelope.
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Replaces stale signatures in `original` with fresh observations and
    /// re-stamps it with `roster.index`.
    ///
    /// Existing signatures are kept when their guardian index has a fresh
    /// observation under `roster`; the rest are stale. Stale slots are
    /// filled from fresh observations for guardians not already present,
    /// lowest guardian index first. The signature count never changes.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::Input`] if any input is empty or no observation
    ///   survives filtering and decoding
    /// - [`ReconcileError::Decode`] if `original` cannot be parsed
    /// - [`ReconcileError::Quorum`] if there are fewer replacements than
    ///   stale signatures; carries `original` unchanged
    /// - [`ReconcileError::Integrity`] if the composed count drifts
    /// - [`ReconcileError::Serialization`] if re-encoding fails
    pub fn reconcile(
        &self,
        original: &[u8],
        roster: &GuardianSet,
        observations: &[Observation],
    ) -> Result<Reconciliation, ReconcileError> {
        if original.is_empty() {
            return Err(ReconcileError::Input("attestation bytes are empty".into()));
        }
        if roster.is_empty() {
            return Err(ReconcileError::Input("guardian set is empty".into()));
        }
        if observations.is_empty() {
            return Err(ReconcileError::Input("no observations supplied".into()));
        }

        let mut report = ReconcileReport {
            guardian_set_index: roster.index,
            quorum: roster.quorum(),
            ..ReconcileReport::default()
        };

        let fresh = collect_fresh(roster, observations, &mut report);
        if fresh.is_empty() {
            return Err(ReconcileError::Input(format!(
                "none of {} observations is usable under guardian set {}",
                observations.len(),
                roster.index
            )));
        }

        let parsed = self
            .codec
            .decode(original)
            .map_err(DecodeError::Attestation)?;
        report.previous_guardian_set_index = parsed.guardian_set_index;

        let (retained, stale): (Vec<Signature>, Vec<Signature>) = parsed
            .signatures
            .iter()
            .partition(|sig| fresh.contains_key(&sig.guardian_index));
        let retained_indexes: BTreeSet<u8> = retained.iter().map(|s| s.guardian_index).collect();

        let pool: Vec<Signature> = fresh
            .values()
            .filter(|sig| !retained_indexes.contains(&sig.guardian_index))
            .copied()
            .collect();
        if pool.len() < stale.len() {
            warn!(
                stale = stale.len(),
                available = pool.len(),
                "not enough fresh signatures to replace stale ones"
            );
            return Err(ReconcileError::Quorum {
                stale: stale.len(),
                available: pool.len(),
                original: original.to_vec(),
            });
        }
        let replacements = &pool[..stale.len()];

        let mut signatures: Vec<Signature> = retained
            .iter()
            .chain(replacements.iter())
            .copied()
            .collect();
        signatures.sort_by_key(|sig| sig.guardian_index);

        if signatures.len() != parsed.signatures.len() {
            return Err(ReconcileError::Integrity {
                expected: parsed.signatures.len(),
                actual: signatures.len(),
            });
        }

        if signatures.len() < report.quorum {
            warn!(
                signatures = signatures.len(),
                quorum = report.quorum,
                "patched attestation is below quorum for the target roster"
            );
        }

        report.retained = retained.iter().map(|s| s.guardian_index).collect();
        report.stale = stale.iter().map(|s| s.guardian_index).collect();
        report.replacements = replacements.iter().map(|s| s.guardian_index).collect();

        let patched = Attestation {
            guardian_set_index: roster.index,
            signatures,
            ..parsed
        };
        let bytes = self
            .codec
            .encode(&patched)
            .map_err(ReconcileError::Serialization)?;

        info!(
            digest = %patched.digest(),
            from_set = report.previous_guardian_set_index,
            to_set = report.guardian_set_index,
            retained = report.retained.len(),
            replaced = report.replacements.len(),
            "attestation reconciled"
        );

        Ok(Reconciliation { bytes, report })
    }
}

/// Reconciles with the canonical wire codec.
pub fn reconcile(
    original: &[u8],
    roster: &GuardianSet,
    observations: &[Observation],
) -> Result<Reconciliation, ReconcileError> {
    Reconciler::new(WireCodec).reconcile(original, roster, observations)
}

/// Resolves observations to roster positions. First observation per
/// guardian wins; keyed by guardian index so iteration is ascending.
fn collect_fresh(
    roster: &GuardianSet,
    observations: &[Observation],
    report: &mut ReconcileReport,
) -> BTreeMap<u8, Signature> {
    let positions = roster.index_map();
    let mut fresh = BTreeMap::new();

    for obs in observations {
        let Some(&index) = positions.get(&obs.guardian_address) else {
            debug!(guardian = %obs.guardian_address, "observation signer not in target roster");
            report.off_roster += 1;
            continue;
        };
        let decoded = match decode_signature(&obs.signature) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(guardian = %obs.guardian_address, error = %err, "dropping malformed observation");
                report.malformed += 1;
                continue;
            }
        };
        if fresh.contains_key(&index) {
            debug!(guardian = %obs.guardian_address, index, "duplicate observation dropped");
            report.duplicates += 1;
            continue;
        }
        fresh.insert(index, decoded.at_index(index));
    }

    fresh
}
