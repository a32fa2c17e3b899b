//! In-memory attendance storage, for tests and single-process development.

use crate::error::StoreError;
use crate::store::{AttendanceStore, InsertOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rollcall_core::AttendanceRecord;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryAttendanceStore {
    // Both maps guard their own invariant under a single lock each; the
    // insert-if-absent check and write happen under one critical section,
    // which is this backend's version of the uniqueness constraint.
    records: Mutex<HashMap<(String, String), AttendanceRecord>>,
    issuances: Mutex<Vec<(String, String, DateTime<Utc>)>>,
}

impl MemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored attendance records.
    pub fn record_count(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Number of issuance metadata entries still present.
    pub fn issuance_count(&self) -> usize {
        self.issuances.lock().map(|i| i.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn insert_attendance_if_absent(
        &self,
        session_id: &str,
        holder_id: &str,
        issuer_id: &str,
        metadata: serde_json::Value,
    ) -> Result<InsertOutcome, StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let key = (session_id.to_string(), holder_id.to_string());
        if let Some(existing) = records.get(&key) {
            return Ok(InsertOutcome {
                inserted: false,
                record: existing.clone(),
            });
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            holder_id: holder_id.to_string(),
            recorded_at: Utc::now(),
            source_issuer_id: issuer_id.to_string(),
            metadata,
        };
        records.insert(key, record.clone());
        Ok(InsertOutcome {
            inserted: true,
            record,
        })
    }

    async fn record_checkin_issued(
        &self,
        session_id: &str,
        issuer_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut issuances = self
            .issuances
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        issuances.push((session_id.to_string(), issuer_id.to_string(), issued_at));
        Ok(())
    }

    async fn sweep_expired_checkin_metadata(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut issuances = self
            .issuances
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let before = issuances.len();
        issuances.retain(|(_, _, issued_at)| *issued_at >= cutoff);
        Ok((before - issuances.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_insert_returns_the_winner() {
        let store = MemoryAttendanceStore::new();

        let first = store
            .insert_attendance_if_absent("sess-42", "student-7", "teacher-1", serde_json::Value::Null)
            .await
            .unwrap();
        assert!(first.inserted);

        let second = store
            .insert_attendance_if_absent("sess-42", "student-7", "teacher-1", serde_json::Value::Null)
            .await
            .unwrap();
        assert!(!second.inserted);
        assert_eq!(second.record, first.record);
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn different_pairs_are_independent() {
        let store = MemoryAttendanceStore::new();
        for holder in ["a", "b", "c"] {
            let outcome = store
                .insert_attendance_if_absent("sess-42", holder, "t", serde_json::Value::Null)
                .await
                .unwrap();
            assert!(outcome.inserted);
        }
        assert_eq!(store.record_count(), 3);
    }

    #[tokio::test]
    async fn sweep_clears_only_entries_past_cutoff() {
        let store = MemoryAttendanceStore::new();
        let now = Utc::now();

        store
            .record_checkin_issued("old", "t", now - chrono::Duration::hours(48))
            .await
            .unwrap();
        store.record_checkin_issued("new", "t", now).await.unwrap();

        let cutoff = now - chrono::Duration::hours(24);
        assert_eq!(store.sweep_expired_checkin_metadata(cutoff).await.unwrap(), 1);
        assert_eq!(store.issuance_count(), 1);

        // Idempotent: a second pass finds nothing.
        assert_eq!(store.sweep_expired_checkin_metadata(cutoff).await.unwrap(), 0);
    }
}
