//! Fetch, verify and re-seal pipeline around the reconciliation engine.
//!
//! Collaborators are traits so the orchestrator can run against live
//! endpoints (Wormholescan, Ethereum and Solana JSON-RPC) or in-memory
//! fakes. Every collaborator call goes through a [`RetryPolicy`].
//!
#![deny(missing_docs)]

/// Solidity ABI helpers for the core contract verifier.
pub mod abi;
/// Pipeline configuration.
pub mod config;
/// Error types for the pipeline.
pub mod errors;
/// Transaction and batch orchestration.
pub mod orchestrator;
/// Retry with exponential backoff.
pub mod retry;
/// JSON-RPC collaborators.
pub mod rpc;
/// Collaborator traits and verifier types.
pub mod traits;
/// Wormholescan REST collaborators.
pub mod wormholescan;

pub use config::PipelineConfig;
pub use errors::PipelineError;
pub use orchestrator::{
    BatchReport, BatchSummary, Collaborators, Orchestrator, Stage, TxReport, VaaOutcome,
    VaaReport,
};
pub use retry::RetryPolicy;
pub use rpc::{CoreVerifier, EthereumReceipts, JsonRpcClient, SolanaReceipts};
pub use traits::{
    AttestationSource, GuardianSetSource, ObservationSource, ReceiptSource, ValidityOracle,
    Verdict, VerifiedHeader,
};
pub use wormholescan::{observations_from_json, GuardianSetDocument, WormholeScanClient};
