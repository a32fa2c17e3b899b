//! Roster eligibility reads.
//!
//! The roster belongs to the surrounding enrollment system; the token core
//! only asks one question of it and caches nothing.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::collections::HashSet;

/// "Is holder X an active participant of session Y at time T."
#[async_trait]
pub trait Roster: Send + Sync {
    async fn is_eligible(
        &self,
        holder_id: &str,
        session_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

/// Fixed in-memory roster for tests and development.
#[derive(Default)]
pub struct StaticRoster {
    entries: HashSet<(String, String)>,
}

impl StaticRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit a (session, holder) pair.
    pub fn permit(mut self, session_id: impl Into<String>, holder_id: impl Into<String>) -> Self {
        self.entries.insert((session_id.into(), holder_id.into()));
        self
    }
}

#[async_trait]
impl Roster for StaticRoster {
    async fn is_eligible(
        &self,
        holder_id: &str,
        session_id: &str,
        _at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .entries
            .contains(&(session_id.to_string(), holder_id.to_string())))
    }
}

/// Postgres-backed roster reading the enrollment system's table.
/// Read-only: this crate never manages that schema.
pub struct PgRoster {
    pool: sqlx::PgPool,
}

impl PgRoster {
    pub fn with_pool(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Roster for PgRoster {
    async fn is_eligible(
        &self,
        holder_id: &str,
        session_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM enrollments
                WHERE session_id = $1
                  AND holder_id = $2
                  AND active
                  AND (valid_from IS NULL OR valid_from <= $3)
                  AND (valid_until IS NULL OR valid_until > $3)
            ) AS eligible
            "#,
        )
        .bind(session_id)
        .bind(holder_id)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get::<bool, _>("eligible")?)
    }
}

/// SQLite-backed roster, mirroring [`PgRoster`] for the embedded backend.
pub struct SqliteRoster {
    pool: sqlx::SqlitePool,
}

impl SqliteRoster {
    pub fn with_pool(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Roster for SqliteRoster {
    async fn is_eligible(
        &self,
        holder_id: &str,
        session_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let at = at.to_rfc3339();
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM enrollments
                WHERE session_id = ?1
                  AND holder_id = ?2
                  AND active
                  AND (valid_from IS NULL OR valid_from <= ?3)
                  AND (valid_until IS NULL OR valid_until > ?3)
            ) AS eligible
            "#,
        )
        .bind(session_id)
        .bind(holder_id)
        .bind(&at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get::<bool, _>("eligible")?)
    }
}
