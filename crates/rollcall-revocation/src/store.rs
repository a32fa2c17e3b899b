//! Revocation records keyed by token fingerprint.

use crate::error::RevocationError;
use crate::kv::TtlStore;
use chrono::{DateTime, Utc};
use rollcall_token::SessionClaims;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// Key namespace for revocation entries in the shared store.
const KEY_PREFIX: &str = "rollcall:revoked:";

/// Fingerprint length in hex characters (128 bits of the token digest).
const FINGERPRINT_LEN: usize = 32;

/// Value stored for a revoked token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevocationRecord {
    pub subject_id: String,
    pub role: String,
    pub revoked_at: DateTime<Utc>,
    pub reason: String,
}

/// Records tokens invalidated before natural expiry.
///
/// Owned exclusively by this type: no other component writes revocation
/// entries, and eviction is the backing store's TTL mechanism.
pub struct RevocationStore {
    kv: Arc<dyn TtlStore>,
    floor_ttl: Duration,
}

impl RevocationStore {
    /// `floor_ttl` is the minimum retention for any record, regardless of
    /// the token's remaining lifetime. A revocation may therefore outlive
    /// the token's natural expiry; the margin absorbs clock skew between
    /// the issuing host and the store.
    pub fn new(kv: Arc<dyn TtlStore>, floor_ttl: Duration) -> Self {
        Self { kv, floor_ttl }
    }

    /// Deterministic shortening of a token string into a lookup key.
    /// Works on the opaque token; no claim decoding involved.
    pub fn fingerprint(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(FINGERPRINT_LEN);
        hex
    }

    /// Record a revocation. A token whose natural expiry has already passed
    /// is a quiet no-op: there is nothing left to protect.
    pub async fn revoke(
        &self,
        token: &str,
        claims: &SessionClaims,
        reason: &str,
    ) -> Result<(), RevocationError> {
        self.revoke_at(token, claims, reason, Utc::now()).await
    }

    /// Record a revocation with an explicit clock, for deterministic tests.
    pub async fn revoke_at(
        &self,
        token: &str,
        claims: &SessionClaims,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), RevocationError> {
        let remaining = claims.remaining(now);
        if remaining <= chrono::Duration::zero() {
            tracing::debug!(
                subject_id = %claims.subject_id,
                "skipping revocation of naturally expired token"
            );
            return Ok(());
        }

        let record = RevocationRecord {
            subject_id: claims.subject_id.clone(),
            role: claims.role.clone(),
            revoked_at: now,
            reason: reason.to_string(),
        };
        let value = serde_json::to_string(&record)
            .map_err(|e| RevocationError::Serialization(e.to_string()))?;

        let ttl = retention_for(remaining, self.floor_ttl);
        let key = format!("{}{}", KEY_PREFIX, Self::fingerprint(token));
        self.kv.set(&key, &value, ttl).await?;

        tracing::info!(
            subject_id = %claims.subject_id,
            reason = %record.reason,
            ttl_secs = ttl.as_secs(),
            "session token revoked"
        );
        Ok(())
    }

    /// Existence check by fingerprint. Runs on the request hot path; the
    /// backing store enforces per-operation timeouts.
    pub async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        let key = format!("{}{}", KEY_PREFIX, Self::fingerprint(token));
        Ok(self.kv.get(&key).await?.is_some())
    }
}

/// Record retention: at least the token's remaining natural lifetime, never
/// below the configured floor.
fn retention_for(remaining: chrono::Duration, floor: Duration) -> Duration {
    let remaining = remaining.to_std().unwrap_or(Duration::ZERO);
    remaining.max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryTtlStore;
    use chrono::Duration as ChronoDuration;
    use rollcall_token::{SessionTokenService, Signer};

    fn claims(now: DateTime<Utc>, ttl_secs: i64) -> SessionClaims {
        SessionClaims {
            subject_id: "student-7".to_string(),
            role: "student".to_string(),
            issued_at: now,
            expires_at: now + ChronoDuration::seconds(ttl_secs),
        }
    }

    #[test]
    fn fingerprint_is_deterministic_and_short() {
        let a = RevocationStore::fingerprint("token-a");
        assert_eq!(a, RevocationStore::fingerprint("token-a"));
        assert_ne!(a, RevocationStore::fingerprint("token-b"));
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn retention_never_drops_below_floor_or_remaining() {
        let floor = Duration::from_secs(86_400);
        assert_eq!(
            retention_for(ChronoDuration::seconds(50), floor),
            floor
        );
        assert_eq!(
            retention_for(ChronoDuration::seconds(200_000), floor),
            Duration::from_secs(200_000)
        );
    }

    #[tokio::test]
    async fn revoked_token_is_found_until_ttl() {
        let store = RevocationStore::new(
            Arc::new(MemoryTtlStore::new()),
            Duration::from_secs(86_400),
        );
        let now = Utc::now();
        let token = SessionTokenService::new(Signer::generate())
            .issue_at("student-7", "student", ChronoDuration::seconds(60), now)
            .unwrap();

        assert!(!store.is_revoked(&token).await.unwrap());
        store
            .revoke_at(&token, &claims(now, 60), "logout", now + ChronoDuration::seconds(10))
            .await
            .unwrap();
        assert!(store.is_revoked(&token).await.unwrap());
    }

    #[tokio::test]
    async fn naturally_expired_token_revocation_is_a_noop() {
        let store = RevocationStore::new(
            Arc::new(MemoryTtlStore::new()),
            Duration::from_secs(86_400),
        );
        let now = Utc::now();

        store
            .revoke_at("tok", &claims(now, 60), "logout", now + ChronoDuration::seconds(61))
            .await
            .unwrap();
        assert!(!store.is_revoked("tok").await.unwrap());
    }
}
