//! Error types for the runtime flows.

use rollcall_token::TokenError;
use thiserror::Error;

/// Authentication failures, as surfaced to callers.
///
/// Format and signature failures collapse into `InvalidToken` so the
/// response does not distinguish them (oracle avoidance); the distinction
/// survives in debug logs only.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    Expired,

    #[error("token revoked")]
    Revoked,

    /// Revocation store unreachable under a fail-closed policy. Retryable.
    #[error("infrastructure unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// Stable wire code for error responses.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidToken => "invalid_token",
            AuthError::Expired => "expired",
            AuthError::Revoked => "revoked",
            AuthError::Unavailable(_) => "infrastructure_unavailable",
        }
    }
}

/// Infrastructure failure during redemption. Validation rejections are not
/// errors; they are [`crate::RedemptionOutcome::Rejected`] outcomes.
#[derive(Debug, Error)]
pub enum RedeemError {
    #[error("infrastructure unavailable: {0}")]
    Unavailable(String),
}

/// Failures when minting a check-in token.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("infrastructure unavailable: {0}")]
    Unavailable(String),
}
