//! End-to-end repair: receipt → ids → fetch → check → reconcile → re-check.
//!
//! Each attestation is processed independently. A failure at any stage is
//! recorded against that attestation and the batch moves on.

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;
use crate::traits::{
    serialize_prefixed_hex, AttestationSource, GuardianSetSource, ObservationSource,
    ReceiptSource, ValidityOracle, Verdict,
};
use reseal_canonical::VaaId;
use reseal_core::{ReconcileReport, Reconciler};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use tracing::{error, info, warn};

/// Default number of transactions processed concurrently.
pub const DEFAULT_WORKERS: usize = 4;

/// Borrowed collaborators the orchestrator drives.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Transaction → attestation ids.
    pub receipts: &'a dyn ReceiptSource,
    /// Signed attestation bytes.
    pub attestations: &'a dyn AttestationSource,
    /// Current guardian roster.
    pub guardian_sets: &'a dyn GuardianSetSource,
    /// Fresh guardian observations.
    pub observations: &'a dyn ObservationSource,
    /// Read-only verifier.
    pub oracle: &'a dyn ValidityOracle,
}

/// Pipeline step an attestation was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Resolving the transaction receipt.
    Receipt,
    /// Fetching the signed attestation.
    FetchAttestation,
    /// Checking the original attestation.
    ValidityCheck,
    /// Fetching the current roster.
    FetchGuardianSet,
    /// Fetching observations.
    FetchObservations,
    /// Running the reconciliation engine.
    Reconcile,
    /// Checking the patched attestation.
    Reverify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Receipt => "receipt",
            Stage::FetchAttestation => "fetch_attestation",
            Stage::ValidityCheck => "validity_check",
            Stage::FetchGuardianSet => "fetch_guardian_set",
            Stage::FetchObservations => "fetch_observations",
            Stage::Reconcile => "reconcile",
            Stage::Reverify => "reverify",
        };
        f.write_str(name)
    }
}

/// Result of processing one attestation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VaaOutcome {
    /// The original attestation already verifies; nothing was changed.
    AlreadyValid,
    /// A patched attestation was produced. `verdict.valid` may still be
    /// false; that is reported, not retried.
    Repaired {
        /// Patched attestation bytes.
        #[serde(serialize_with = "serialize_prefixed_hex")]
        patched: Vec<u8>,
        /// What reconciliation changed.
        report: ReconcileReport,
        /// Verifier verdict on the patched bytes.
        verdict: Verdict,
    },
    /// Processing stopped at `stage`.
    Failed {
        /// Stage that failed.
        stage: Stage,
        /// Rendered error.
        error: String,
    },
}

impl VaaOutcome {
    fn failed(stage: Stage, err: PipelineError) -> Self {
        VaaOutcome::Failed {
            stage,
            error: err.to_string(),
        }
    }
}

/// Outcome for one attestation id.
#[derive(Debug, Clone, Serialize)]
pub struct VaaReport {
    /// Attestation id.
    pub id: VaaId,
    /// What happened to it.
    #[serde(flatten)]
    pub outcome: VaaOutcome,
}

/// Outcome for one transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TxReport {
    /// Transaction hash or signature as given.
    pub tx: String,
    /// Receipt failure, if ids could not be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-attestation outcomes, in emission order.
    pub vaas: Vec<VaaReport>,
}

/// Outcomes for a batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// One entry per input transaction.
    pub transactions: Vec<TxReport>,
}

/// Outcome counts across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Transactions processed.
    pub transactions: usize,
    /// Transactions whose receipt could not be resolved.
    pub failed_transactions: usize,
    /// Attestations that already verified.
    pub already_valid: usize,
    /// Patched attestations that verify.
    pub repaired: usize,
    /// Patched attestations the verifier still rejects.
    pub rejected: usize,
    /// Attestations that failed at some stage.
    pub failed: usize,
}

impl BatchReport {
    /// Counts outcomes by kind.
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            transactions: self.transactions.len(),
            ..BatchSummary::default()
        };
        for tx in &self.transactions {
            if tx.error.is_some() {
                summary.failed_transactions += 1;
            }
            for vaa in &tx.vaas {
                match &vaa.outcome {
                    VaaOutcome::AlreadyValid => summary.already_valid += 1,
                    VaaOutcome::Repaired { verdict, .. } if verdict.valid => {
                        summary.repaired += 1
                    }
                    VaaOutcome::Repaired { .. } => summary.rejected += 1,
                    VaaOutcome::Failed { .. } => summary.failed += 1,
                }
            }
        }
        summary
    }
}

/// Drives collaborators and the reconciliation engine over transactions.
pub struct Orchestrator<'a> {
    sources: Collaborators<'a>,
    retry: RetryPolicy,
    workers: usize,
    reconciler: Reconciler,
}

impl<'a> Orchestrator<'a> {
    /// Creates an orchestrator with default retry and worker settings.
    pub fn new(sources: Collaborators<'a>) -> Self {
        Self {
            sources,
            retry: RetryPolicy::default(),
            workers: DEFAULT_WORKERS,
            reconciler: Reconciler::default(),
        }
    }

    /// Sets the retry policy for collaborator calls.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the number of concurrent workers (minimum 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Resolves a transaction's attestation ids and processes each.
    pub fn process_transaction(&self, tx: &str) -> TxReport {
        info!(tx, "processing transaction");
        let ids = match self.retry.run("vaa_ids", || self.sources.receipts.vaa_ids(tx)) {
            Ok(ids) => ids,
            Err(err) => {
                error!(tx, stage = %Stage::Receipt, error = %err, "receipt lookup failed");
                return TxReport {
                    tx: tx.to_string(),
                    error: Some(err.to_string()),
                    vaas: Vec::new(),
                };
            }
        };
        if ids.is_empty() {
            warn!(tx, "transaction emitted no attestations");
        }

        let vaas = ids
            .into_iter()
            .map(|id| VaaReport {
                outcome: self.process_vaa(&id),
                id,
            })
            .collect();
        TxReport {
            tx: tx.to_string(),
            error: None,
            vaas,
        }
    }

    /// Processes a single attestation id.
    pub fn process_vaa(&self, id: &VaaId) -> VaaOutcome {
        match self.try_process_vaa(id) {
            Ok(outcome) => outcome,
            Err((stage, err)) => {
                error!(vaa = %id, %stage, error = %err, "attestation failed");
                VaaOutcome::failed(stage, err)
            }
        }
    }

    fn try_process_vaa(&self, id: &VaaId) -> Result<VaaOutcome, (Stage, PipelineError)> {
        let at = |stage: Stage| move |err: PipelineError| (stage, err);
        let s = &self.sources;

        let original = self
            .retry
            .run("signed_vaa", || s.attestations.signed_vaa(id))
            .map_err(at(Stage::FetchAttestation))?;

        let verdict = self
            .retry
            .run("verify", || s.oracle.verify(&original))
            .map_err(at(Stage::ValidityCheck))?;
        if verdict.valid {
            info!(vaa = %id, "attestation already valid");
            return Ok(VaaOutcome::AlreadyValid);
        }
        info!(vaa = %id, reason = %verdict.reason, "attestation rejected, reconciling");

        let roster = self
            .retry
            .run("guardian_set", || s.guardian_sets.current_guardian_set())
            .map_err(at(Stage::FetchGuardianSet))?;
        let observations = self
            .retry
            .run("observations", || s.observations.observations(id))
            .map_err(at(Stage::FetchObservations))?;

        let reconciliation = self
            .reconciler
            .reconcile(&original, &roster, &observations)
            .map_err(|err| (Stage::Reconcile, PipelineError::from(err)))?;

        let verdict = self
            .retry
            .run("reverify", || s.oracle.verify(&reconciliation.bytes))
            .map_err(at(Stage::Reverify))?;
        if verdict.valid {
            info!(vaa = %id, "patched attestation verifies");
        } else {
            warn!(vaa = %id, reason = %verdict.reason, "patched attestation still rejected");
        }

        Ok(VaaOutcome::Repaired {
            patched: reconciliation.bytes,
            report: reconciliation.report,
            verdict,
        })
    }

    /// Processes `txs` on a bounded pool of scoped threads. The report
    /// lists transactions in input order.
    pub fn run_batch(&self, txs: &[String]) -> BatchReport {
        let workers = self.workers.min(txs.len()).max(1);
        let next = AtomicUsize::new(0);
        let (sender, receiver) = mpsc::channel();

        thread::scope(|scope| {
            for _ in 0..workers {
                let sender = sender.clone();
                let next = &next;
                scope.spawn(move || loop {
                    let i = next.fetch_add(1, Ordering::Relaxed);
                    let Some(tx) = txs.get(i) else { break };
                    if sender.send((i, self.process_transaction(tx))).is_err() {
                        break;
                    }
                });
            }
        });
        drop(sender);

        let mut slots: Vec<Option<TxReport>> = vec![None; txs.len()];
        for (i, report) in receiver {
            slots[i] = Some(report);
        }
        BatchReport {
            transactions: slots.into_iter().flatten().collect(),
        }
    }
}
