//! Error types for the revocation side-channel.

use thiserror::Error;

/// Errors from revocation store operations.
#[derive(Debug, Error)]
pub enum RevocationError {
    /// The backing store could not be reached (or timed out). Retryable;
    /// callers decide between fail-open and fail-closed.
    #[error("revocation store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be serialized.
    #[error("revocation record serialization error: {0}")]
    Serialization(String),
}
