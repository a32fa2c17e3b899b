//! Error types for storage collaborators.

use thiserror::Error;

/// Errors from attendance storage and roster reads.
///
/// Everything here is an infrastructure failure from the protocol's point
/// of view: retryable, and distinct from validation rejections.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable, pool exhausted, or I/O failure.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Query failed or returned something unusable.
    #[error("storage error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}
