//! Background eviction of stale check-in issuance metadata.

use chrono::Utc;
use rollcall_store::{AttendanceStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// Periodic task clearing issuance metadata whose validity window has
/// elapsed.
///
/// Idempotent and safe to run concurrently with itself and with
/// redemption: token validation derives from `issued_at` inside the token,
/// never from metadata presence, so an eviction cannot retroactively
/// invalidate anything. Holds no locks that block redemption.
pub struct ExpirySweeper {
    store: Arc<dyn AttendanceStore>,
    window: chrono::Duration,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(store: Arc<dyn AttendanceStore>, window: chrono::Duration, interval: Duration) -> Self {
        Self {
            store,
            window,
            interval,
        }
    }

    /// One sweep pass. Exposed for tests and manual operations.
    pub async fn run_once(&self) -> Result<u64, StoreError> {
        let cutoff = Utc::now() - self.window;
        let cleared = self.store.sweep_expired_checkin_metadata(cutoff).await?;
        if cleared > 0 {
            tracing::info!(cleared, %cutoff, "swept expired check-in metadata");
        } else {
            tracing::debug!(%cutoff, "sweep pass found nothing to clear");
        }
        Ok(cleared)
    }

    /// Run on a fixed interval, detached from request handling. Failures
    /// are logged and the loop keeps going; the next pass retries.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    tracing::warn!(error = %e, "sweep pass failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_store::MemoryAttendanceStore;

    #[tokio::test]
    async fn run_once_clears_only_stale_entries() {
        let store = Arc::new(MemoryAttendanceStore::new());
        let now = Utc::now();
        store
            .record_checkin_issued("old-session", "t", now - chrono::Duration::hours(30))
            .await
            .unwrap();
        store
            .record_checkin_issued("fresh-session", "t", now - chrono::Duration::hours(1))
            .await
            .unwrap();

        let sweeper = ExpirySweeper::new(
            store.clone(),
            chrono::Duration::hours(24),
            Duration::from_secs(60),
        );

        assert_eq!(sweeper.run_once().await.unwrap(), 1);
        assert_eq!(store.issuance_count(), 1);

        // Idempotent across repeated and concurrent passes.
        assert_eq!(sweeper.run_once().await.unwrap(), 0);
    }
}
