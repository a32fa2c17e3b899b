//! The redemption protocol: check-in token in, attendance record out.

use crate::error::RedeemError;
use chrono::{DateTime, Utc};
use rollcall_core::{AttendanceRecord, RedemptionStatus, RejectReason};
use rollcall_store::{AttendanceStore, Roster};
use rollcall_token::{CheckinTokenService, TokenError};
use std::sync::Arc;
use std::time::Duration;

/// Terminal result of a redemption attempt.
///
/// `AlreadyRecorded` is a successful, idempotent outcome carrying the
/// pre-existing record, not an error.
#[derive(Debug, Clone)]
pub enum RedemptionOutcome {
    Recorded(AttendanceRecord),
    AlreadyRecorded(AttendanceRecord),
    Rejected(RejectReason),
}

impl RedemptionOutcome {
    pub fn status(&self) -> RedemptionStatus {
        match self {
            RedemptionOutcome::Recorded(_) => RedemptionStatus::Recorded,
            RedemptionOutcome::AlreadyRecorded(_) => RedemptionStatus::AlreadyRecorded,
            RedemptionOutcome::Rejected(_) => RedemptionStatus::Rejected,
        }
    }

    pub fn record(&self) -> Option<&AttendanceRecord> {
        match self {
            RedemptionOutcome::Recorded(r) | RedemptionOutcome::AlreadyRecorded(r) => Some(r),
            RedemptionOutcome::Rejected(_) => None,
        }
    }
}

/// Executes the check-in protocol: validate the token, confirm holder
/// eligibility against the roster, then commit the attendance record
/// through the storage layer's uniqueness constraint.
pub struct RedemptionCoordinator {
    checkin: Arc<CheckinTokenService>,
    roster: Arc<dyn Roster>,
    store: Arc<dyn AttendanceStore>,
    op_timeout: Duration,
}

impl RedemptionCoordinator {
    pub fn new(
        checkin: Arc<CheckinTokenService>,
        roster: Arc<dyn Roster>,
        store: Arc<dyn AttendanceStore>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            checkin,
            roster,
            store,
            op_timeout,
        }
    }

    pub async fn redeem(
        &self,
        token: &str,
        holder_id: &str,
    ) -> Result<RedemptionOutcome, RedeemError> {
        self.redeem_at(token, holder_id, Utc::now()).await
    }

    /// Run one redemption attempt against an explicit clock.
    pub async fn redeem_at(
        &self,
        token: &str,
        holder_id: &str,
        now: DateTime<Utc>,
    ) -> Result<RedemptionOutcome, RedeemError> {
        // Signature and window first: deterministic, no I/O.
        let claims = match self.checkin.validate_at(token, now) {
            Ok(claims) => claims,
            Err(TokenError::Expired { expired_at }) => {
                tracing::debug!(holder_id, %expired_at, "redemption rejected: token expired");
                return Ok(RedemptionOutcome::Rejected(RejectReason::Expired));
            }
            Err(e) => {
                tracing::debug!(holder_id, error = %e, "redemption rejected: token tampered");
                return Ok(RedemptionOutcome::Rejected(RejectReason::Tampered));
            }
        };

        tracing::trace!(holder_id, session_id = %claims.session_id, state = "signature_checked");

        let eligible = self
            .bounded(
                "roster",
                self.roster.is_eligible(holder_id, &claims.session_id, now),
            )
            .await?;
        if !eligible {
            tracing::info!(
                holder_id,
                session_id = %claims.session_id,
                "redemption rejected: holder not on roster"
            );
            return Ok(RedemptionOutcome::Rejected(RejectReason::NotEligible));
        }

        tracing::trace!(holder_id, session_id = %claims.session_id, state = "eligibility_checked");

        // The insert is the only write; the storage layer's uniqueness
        // constraint decides races, never a prior read.
        let outcome = self
            .bounded(
                "storage",
                self.store.insert_attendance_if_absent(
                    &claims.session_id,
                    holder_id,
                    &claims.issuer_id,
                    serde_json::json!({ "token_issued_at": claims.issued_at }),
                ),
            )
            .await?;

        if outcome.inserted {
            tracing::info!(
                holder_id,
                session_id = %claims.session_id,
                record_id = %outcome.record.id,
                "attendance recorded"
            );
            Ok(RedemptionOutcome::Recorded(outcome.record))
        } else {
            tracing::debug!(
                holder_id,
                session_id = %claims.session_id,
                record_id = %outcome.record.id,
                "attendance already recorded"
            );
            Ok(RedemptionOutcome::AlreadyRecorded(outcome.record))
        }
    }

    /// Run an outbound call under the per-operation timeout, folding both
    /// elapsed timers and store failures into the retryable error channel.
    async fn bounded<T>(
        &self,
        what: &'static str,
        fut: impl Future<Output = Result<T, rollcall_store::StoreError>>,
    ) -> Result<T, RedeemError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(RedeemError::Unavailable(format!("{what}: {e}"))),
            Err(_) => Err(RedeemError::Unavailable(format!("{what}: timed out"))),
        }
    }
}
