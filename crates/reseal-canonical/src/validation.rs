use thiserror::Error;

/// Validation errors for addresses, identifiers and rosters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text that does not have the expected shape.
    #[error("{field} '{value}' is malformed")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// Number or collection size outside its range.
    #[error("{field} ({value}) is out of range")]
    OutOfBounds {
        /// Field name that is out of range.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// When a fixed-width value has the wrong number of bytes.
    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// Field name with the wrong width.
        field: &'static str,
        /// Required width in bytes.
        expected: usize,
        /// Width that was supplied.
        actual: usize,
    },
    /// When a hex-encoded value cannot be decoded.
    #[error("{field} is not valid hex: {reason}")]
    InvalidHex {
        /// Field name that failed to decode.
        field: &'static str,
        /// Decoder message.
        reason: String,
    },
}
