//! SQLite attendance storage backend.
//!
//! Column types differ from the Postgres backend (ids and metadata ride as
//! TEXT) but the interface and the uniqueness semantics are identical:
//! `INSERT OR IGNORE` loses conflicts atomically inside the engine.

use crate::error::StoreError;
use crate::store::{AttendanceStore, InsertOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rollcall_core::AttendanceRecord;
use sqlx::Row;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use uuid::Uuid;

pub struct SqliteAttendanceStore {
    pool: sqlx::SqlitePool,
}

impl SqliteAttendanceStore {
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the tables and the uniqueness constraint if missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendance_records (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                holder_id TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                source_issuer_id TEXT NOT NULL,
                metadata TEXT NOT NULL DEFAULT 'null',
                UNIQUE (session_id, holder_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS checkin_issuances (
                session_id TEXT NOT NULL,
                issuer_id TEXT NOT NULL,
                issued_at TEXT NOT NULL,
                PRIMARY KEY (session_id, issuer_id, issued_at)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::debug!("attendance schema ensured");
        Ok(())
    }
}

fn record_from_row(row: &SqliteRow) -> Result<AttendanceRecord, StoreError> {
    let id: String = row.try_get("id")?;
    let recorded_at: String = row.try_get("recorded_at")?;
    let metadata: String = row.try_get("metadata")?;

    Ok(AttendanceRecord {
        id: Uuid::parse_str(&id).map_err(|e| StoreError::Database(e.to_string()))?,
        session_id: row.try_get("session_id")?,
        holder_id: row.try_get("holder_id")?,
        recorded_at: recorded_at
            .parse::<DateTime<Utc>>()
            .map_err(|e| StoreError::Database(e.to_string()))?,
        source_issuer_id: row.try_get("source_issuer_id")?,
        metadata: serde_json::from_str(&metadata)
            .map_err(|e| StoreError::Database(e.to_string()))?,
    })
}

#[async_trait]
impl AttendanceStore for SqliteAttendanceStore {
    async fn insert_attendance_if_absent(
        &self,
        session_id: &str,
        holder_id: &str,
        issuer_id: &str,
        metadata: serde_json::Value,
    ) -> Result<InsertOutcome, StoreError> {
        let metadata_text = serde_json::to_string(&metadata)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO attendance_records
                (id, session_id, holder_id, recorded_at, source_issuer_id, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(session_id)
        .bind(holder_id)
        .bind(Utc::now().to_rfc3339())
        .bind(issuer_id)
        .bind(metadata_text)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            r#"
            SELECT id, session_id, holder_id, recorded_at, source_issuer_id, metadata
            FROM attendance_records
            WHERE session_id = ?1 AND holder_id = ?2
            "#,
        )
        .bind(session_id)
        .bind(holder_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(InsertOutcome {
            inserted: result.rows_affected() > 0,
            record: record_from_row(&row)?,
        })
    }

    async fn record_checkin_issued(
        &self,
        session_id: &str,
        issuer_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO checkin_issuances (session_id, issuer_id, issued_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(session_id)
        .bind(issuer_id)
        .bind(issued_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn sweep_expired_checkin_metadata(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM checkin_issuances WHERE issued_at < ?1")
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
