use reseal_canonical::ValidationError;
use reseal_core::ReconcileError;
use thiserror::Error;

/// Errors raised by collaborators and the orchestrator.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Endpoint answered with a non-success status.
    #[error("HTTP status {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },
    /// JSON-RPC endpoint returned an error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A response was well-formed JSON but not the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// A field failed canonical validation at the collaborator boundary.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Base64 payload did not decode.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    /// Hex payload did not decode.
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
    /// Reconciliation failed.
    #[error("reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),
    /// I/O error reading configuration or inputs.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    /// Configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// True for failures worth retrying: timeouts, connection errors,
    /// rate limiting and server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            PipelineError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
