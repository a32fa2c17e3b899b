//! Session authentication: stateless decode plus the revocation check.

use crate::error::AuthError;
use chrono::{DateTime, Utc};
use rollcall_core::UnavailablePolicy;
use rollcall_revocation::RevocationStore;
use rollcall_token::{SessionClaims, SessionTokenService};
use std::sync::Arc;

pub struct Authenticator {
    sessions: SessionTokenService,
    revocation: Arc<RevocationStore>,
    on_unavailable: UnavailablePolicy,
}

impl Authenticator {
    pub fn new(
        sessions: SessionTokenService,
        revocation: Arc<RevocationStore>,
        on_unavailable: UnavailablePolicy,
    ) -> Self {
        Self {
            sessions,
            revocation,
            on_unavailable,
        }
    }

    pub fn sessions(&self) -> &SessionTokenService {
        &self.sessions
    }

    /// Validate a bearer token: signature, expiry, then revocation.
    pub async fn authenticate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.authenticate_at(token, Utc::now()).await
    }

    /// Validate against an explicit clock, for deterministic tests.
    pub async fn authenticate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, AuthError> {
        let claims = self.sessions.decode(token).map_err(|e| {
            // The reason stays in logs; the caller sees one opaque failure.
            tracing::debug!(error = %e, "session token rejected");
            AuthError::InvalidToken
        })?;

        if claims.is_expired(now) {
            return Err(AuthError::Expired);
        }

        match self.revocation.is_revoked(token).await {
            Ok(true) => Err(AuthError::Revoked),
            Ok(false) => Ok(claims),
            Err(e) => match self.on_unavailable {
                UnavailablePolicy::FailOpen => {
                    tracing::warn!(
                        subject_id = %claims.subject_id,
                        error = %e,
                        "revocation store unreachable; allowing per fail-open policy"
                    );
                    Ok(claims)
                }
                UnavailablePolicy::FailClosed => Err(AuthError::Unavailable(e.to_string())),
            },
        }
    }

    /// Revoke the presented token (logout). Decoding must succeed so the
    /// remaining lifetime can be computed; a naturally expired token is a
    /// quiet no-op inside the store.
    pub async fn logout(&self, token: &str, reason: &str) -> Result<(), AuthError> {
        let claims = self
            .sessions
            .decode(token)
            .map_err(|_| AuthError::InvalidToken)?;

        self.revocation
            .revoke(token, &claims, reason)
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rollcall_revocation::MemoryTtlStore;
    use rollcall_token::Signer;

    fn authenticator(policy: UnavailablePolicy) -> Authenticator {
        let signer = Signer::generate();
        let revocation = RevocationStore::new(
            Arc::new(MemoryTtlStore::new()),
            std::time::Duration::from_secs(86_400),
        );
        Authenticator::new(
            SessionTokenService::new(signer),
            Arc::new(revocation),
            policy,
        )
    }

    #[tokio::test]
    async fn valid_token_authenticates() {
        let auth = authenticator(UnavailablePolicy::FailOpen);
        let token = auth
            .sessions()
            .issue("student-7", "student", Duration::seconds(60))
            .unwrap();

        let claims = auth.authenticate(&token).await.unwrap();
        assert_eq!(claims.subject_id, "student-7");
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let auth = authenticator(UnavailablePolicy::FailOpen);
        let now = Utc::now();
        let token = auth
            .sessions()
            .issue_at("student-7", "student", Duration::seconds(60), now)
            .unwrap();

        let result = auth
            .authenticate_at(&token, now + Duration::seconds(60))
            .await;
        assert!(matches!(result, Err(AuthError::Expired)));
    }

    #[tokio::test]
    async fn garbage_is_an_opaque_invalid_token() {
        let auth = authenticator(UnavailablePolicy::FailOpen);
        assert!(matches!(
            auth.authenticate("not-a-token").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn logout_makes_subsequent_authentication_fail_before_expiry() {
        let auth = authenticator(UnavailablePolicy::FailOpen);
        let now = Utc::now();
        let token = auth
            .sessions()
            .issue_at("student-7", "student", Duration::seconds(60), now)
            .unwrap();

        // Logout at t=10s, authenticate at t=11s: still 49s of natural
        // lifetime left, yet the token must be refused from now on.
        auth.logout(&token, "logout").await.unwrap();
        let result = auth
            .authenticate_at(&token, now + Duration::seconds(11))
            .await;
        assert!(matches!(result, Err(AuthError::Revoked)));

        let again = auth
            .authenticate_at(&token, now + Duration::seconds(30))
            .await;
        assert!(matches!(again, Err(AuthError::Revoked)));
    }

    #[tokio::test]
    async fn logout_of_garbage_is_rejected() {
        let auth = authenticator(UnavailablePolicy::FailOpen);
        assert!(matches!(
            auth.logout("garbage", "logout").await,
            Err(AuthError::InvalidToken)
        ));
    }
}
