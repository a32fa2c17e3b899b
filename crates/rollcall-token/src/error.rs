//! Error types for token operations.

use thiserror::Error;

/// Errors that can occur when minting or verifying tokens.
///
/// `InvalidFormat` and `InvalidSignature` are kept distinct for logging,
/// but callers surface them as a single opaque authentication failure so
/// the API does not act as a validity oracle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Token structure could not be parsed.
    #[error("malformed token")]
    InvalidFormat,

    /// Signature does not match the payload.
    #[error("token signature mismatch")]
    InvalidSignature,

    /// Token is past its validity window.
    #[error("token expired at {expired_at}")]
    Expired {
        expired_at: chrono::DateTime<chrono::Utc>,
    },

    /// Requested lifetime is zero or negative.
    #[error("non-positive token lifetime")]
    InvalidLifetime,

    /// Signing secret could not be parsed.
    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),

    /// Claim field contains characters the wire format reserves.
    #[error("invalid claim field: {field}")]
    InvalidField { field: &'static str },

    /// Failed to serialize claims.
    #[error("claims serialization error: {0}")]
    SerializationError(String),
}
