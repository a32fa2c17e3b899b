//! Check-in token issuance flow.

use crate::error::IssueError;
use chrono::{DateTime, Utc};
use rollcall_store::AttendanceStore;
use rollcall_token::CheckinTokenService;
use std::sync::Arc;
use std::time::Duration;

/// What an authorized party gets back when requesting a check-in token.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IssuedCheckin {
    /// The bearer credential itself.
    pub token: String,
    /// Payload to render as a scannable code. Currently the token verbatim.
    pub display_payload: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints check-in tokens and records durable issuance metadata.
///
/// The metadata write feeds the expiry sweeper only; token validation is
/// computed from the token itself and keeps working if a sweep already
/// cleared the row.
pub struct CheckinIssuer {
    checkin: Arc<CheckinTokenService>,
    store: Arc<dyn AttendanceStore>,
    op_timeout: Duration,
}

impl CheckinIssuer {
    pub fn new(
        checkin: Arc<CheckinTokenService>,
        store: Arc<dyn AttendanceStore>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            checkin,
            store,
            op_timeout,
        }
    }

    pub async fn issue_checkin(
        &self,
        session_id: &str,
        issuer_id: &str,
    ) -> Result<IssuedCheckin, IssueError> {
        self.issue_checkin_at(session_id, issuer_id, Utc::now()).await
    }

    pub async fn issue_checkin_at(
        &self,
        session_id: &str,
        issuer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedCheckin, IssueError> {
        // The wire format carries whole seconds; expiry math has to match.
        let issued_at = DateTime::<Utc>::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let token = self.checkin.issue_at(session_id, issuer_id, issued_at)?;

        let write = self
            .store
            .record_checkin_issued(session_id, issuer_id, issued_at);
        match tokio::time::timeout(self.op_timeout, write).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(IssueError::Unavailable(e.to_string())),
            Err(_) => return Err(IssueError::Unavailable("storage: timed out".to_string())),
        }

        tracing::info!(session_id, issuer_id, "check-in token issued");

        Ok(IssuedCheckin {
            display_payload: token.clone(),
            token,
            expires_at: issued_at + self.checkin.window(),
        })
    }
}
