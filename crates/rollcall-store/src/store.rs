//! The attendance storage interface.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rollcall_core::AttendanceRecord;

/// Result of an insert-if-absent attempt.
///
/// `inserted == false` means the uniqueness constraint already held a row
/// for the pair; `record` is then the pre-existing winner, not an error.
#[derive(Debug, Clone)]
pub struct InsertOutcome {
    pub inserted: bool,
    pub record: AttendanceRecord,
}

/// Durable storage for attendance records and check-in issuance metadata.
///
/// Implementations MUST enforce `(session_id, holder_id)` uniqueness at the
/// storage level and detect conflicts atomically within
/// `insert_attendance_if_absent`, never via a separate read-then-write,
/// which loses races between concurrent redemptions.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Insert a record for the pair unless one exists. Exactly one caller
    /// ever observes `inserted == true` for a given pair; all others get
    /// the winning record back.
    async fn insert_attendance_if_absent(
        &self,
        session_id: &str,
        holder_id: &str,
        issuer_id: &str,
        metadata: serde_json::Value,
    ) -> Result<InsertOutcome, StoreError>;

    /// Record that a check-in token was issued for a session. Feeds the
    /// expiry sweeper only; token validation never reads this.
    async fn record_checkin_issued(
        &self,
        session_id: &str,
        issuer_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Evict issuance metadata older than `cutoff`. Idempotent; returns the
    /// number of entries cleared.
    async fn sweep_expired_checkin_metadata(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}
