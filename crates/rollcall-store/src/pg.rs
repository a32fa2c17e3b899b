//! Postgres attendance storage backend.

use crate::error::StoreError;
use crate::store::{AttendanceStore, InsertOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rollcall_core::AttendanceRecord;
use sqlx::Row;
use sqlx::postgres::{PgPoolOptions, PgRow};
use uuid::Uuid;

pub struct PostgresAttendanceStore {
    pool: sqlx::PgPool,
}

impl PostgresAttendanceStore {
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables and the uniqueness constraint if missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendance_records (
                id UUID PRIMARY KEY,
                session_id TEXT NOT NULL,
                holder_id TEXT NOT NULL,
                recorded_at TIMESTAMPTZ NOT NULL,
                source_issuer_id TEXT NOT NULL,
                metadata JSONB NOT NULL DEFAULT 'null'::jsonb,
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
                issued_at TIMESTAMPTZ NOT NULL,
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

fn record_from_row(row: &PgRow) -> Result<AttendanceRecord, StoreError> {
    Ok(AttendanceRecord {
        id: row.try_get::<Uuid, _>("id")?,
        session_id: row.try_get("session_id")?,
        holder_id: row.try_get("holder_id")?,
        recorded_at: row.try_get("recorded_at")?,
        source_issuer_id: row.try_get("source_issuer_id")?,
        metadata: row.try_get::<serde_json::Value, _>("metadata")?,
    })
}

#[async_trait]
impl AttendanceStore for PostgresAttendanceStore {
    async fn insert_attendance_if_absent(
        &self,
        session_id: &str,
        holder_id: &str,
        issuer_id: &str,
        metadata: serde_json::Value,
    ) -> Result<InsertOutcome, StoreError> {
        // Conflict detection rides on the UNIQUE constraint: under
        // concurrent redemption exactly one INSERT returns a row, and the
        // losers read the committed winner afterwards.
        let inserted = sqlx::query(
            r#"
            INSERT INTO attendance_records
                (id, session_id, holder_id, recorded_at, source_issuer_id, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (session_id, holder_id) DO NOTHING
            RETURNING id, session_id, holder_id, recorded_at, source_issuer_id, metadata
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session_id)
        .bind(holder_id)
        .bind(Utc::now())
        .bind(issuer_id)
        .bind(sqlx::types::Json(metadata))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(InsertOutcome {
                inserted: true,
                record: record_from_row(&row)?,
            });
        }

        let existing = sqlx::query(
            r#"
            SELECT id, session_id, holder_id, recorded_at, source_issuer_id, metadata
            FROM attendance_records
            WHERE session_id = $1 AND holder_id = $2
            "#,
        )
        .bind(session_id)
        .bind(holder_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(InsertOutcome {
            inserted: false,
            record: record_from_row(&existing)?,
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
            INSERT INTO checkin_issuances (session_id, issuer_id, issued_at)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(session_id)
        .bind(issuer_id)
        .bind(issued_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn sweep_expired_checkin_metadata(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM checkin_issuances WHERE issued_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
