use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Configuration types shared across all Rollcall crates
pub mod config;

// Re-export commonly used config types for convenience
pub use config::{
    RevocationConfig,
    RollcallConfig,
    ServerConfig,
    StorageBackend,
    StorageConfig,
    SweeperConfig,
    TokenConfig,
    UnavailablePolicy,
};

/// One holder's presence at one session.
///
/// At most one record ever exists for a given `(session_id, holder_id)`
/// pair; the storage layer enforces this with a uniqueness constraint.
/// Records are never mutated or deleted by the token core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub session_id: String,
    pub holder_id: String,
    /// UTC timestamp of the first successful redemption.
    pub recorded_at: DateTime<Utc>,
    /// Who issued the check-in token that produced this record.
    pub source_issuer_id: String,
    /// Free-form redemption metadata (client info, etc.). Non-authoritative.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

/// Terminal outcome of a redemption attempt, as reported to callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    Recorded,
    AlreadyRecorded,
    Rejected,
}

/// Machine-readable reason for a rejected redemption.
///
/// These are deterministic validation failures and are never retried.
/// Infrastructure failures are a separate, retryable error channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Signature mismatch or malformed payload.
    Tampered,
    /// Past the token's validity window.
    Expired,
    /// Holder is not an active participant of the session.
    NotEligible,
}

impl RejectReason {
    /// Stable wire code for error responses.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::Tampered => "tampered",
            RejectReason::Expired => "expired",
            RejectReason::NotEligible => "not_eligible",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_reason_codes_are_snake_case() {
        assert_eq!(RejectReason::NotEligible.code(), "not_eligible");
        assert_eq!(
            serde_json::to_value(RejectReason::NotEligible).unwrap(),
            serde_json::json!("not_eligible")
        );
    }

    #[test]
    fn attendance_record_roundtrips_through_json() {
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            session_id: "sess-42".to_string(),
            holder_id: "student-7".to_string(),
            recorded_at: Utc::now(),
            source_issuer_id: "teacher-1".to_string(),
            metadata: serde_json::json!({ "client": "kiosk" }),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: AttendanceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
