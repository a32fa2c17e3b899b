//! Session token issuance and decoding.

use crate::error::TokenError;
use crate::signer::Signer;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried inside a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub subject_id: String,
    pub role: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Pure expiry comparison; callers control the clock.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Remaining natural lifetime at `now`. Negative once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }
}

/// Issues and decodes session tokens.
///
/// Tokens are stateless: nothing is persisted on issuance. The wire format
/// is `base64url(claims_json) "." base64url(signature)`.
pub struct SessionTokenService {
    signer: Signer,
}

impl SessionTokenService {
    pub fn new(signer: Signer) -> Self {
        Self { signer }
    }

    /// Issue a token for `subject_id` with the given role and lifetime.
    pub fn issue(&self, subject_id: &str, role: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject_id, role, ttl, Utc::now())
    }

    /// Issue with an explicit clock, for deterministic tests.
    pub fn issue_at(
        &self,
        subject_id: &str,
        role: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if ttl <= Duration::zero() {
            return Err(TokenError::InvalidLifetime);
        }

        let claims = SessionClaims {
            subject_id: subject_id.to_string(),
            role: role.to_string(),
            issued_at: now,
            expires_at: now + ttl,
        };

        let payload = serde_json::to_vec(&claims)
            .map_err(|e| TokenError::SerializationError(e.to_string()))?;
        let signature = self.signer.sign(&payload);

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify the signature and parse the claims.
    ///
    /// Deliberately does NOT check expiry or revocation: the same decode
    /// path is used to compute the remaining lifetime of a token being
    /// revoked, and revocation is a separate side-channel lookup.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(TokenError::InvalidFormat)?;
        if signature_b64.contains('.') {
            return Err(TokenError::InvalidFormat);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::InvalidFormat)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::InvalidFormat)?;

        if !self.signer.verify(&payload, &signature) {
            return Err(TokenError::InvalidSignature);
        }

        serde_json::from_slice(&payload).map_err(|_| TokenError::InvalidFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SessionTokenService {
        SessionTokenService::new(Signer::generate())
    }

    #[test]
    fn decode_roundtrips_claims_unchanged() {
        let svc = service();
        let now = Utc::now();
        let token = svc
            .issue_at("student-7", "student", Duration::seconds(60), now)
            .unwrap();

        let claims = svc.decode(&token).unwrap();
        assert_eq!(claims.subject_id, "student-7");
        assert_eq!(claims.role, "student");
        assert_eq!(claims.issued_at, now);
        assert_eq!(claims.expires_at, now + Duration::seconds(60));
    }

    #[test]
    fn expires_at_is_after_issued_at() {
        let svc = service();
        assert_eq!(
            svc.issue("s", "r", Duration::zero()),
            Err(TokenError::InvalidLifetime)
        );
        assert_eq!(
            svc.issue("s", "r", Duration::seconds(-5)),
            Err(TokenError::InvalidLifetime)
        );
    }

    #[test]
    fn decode_rejects_tampered_payload() {
        let svc = service();
        let token = svc.issue("s", "r", Duration::seconds(60)).unwrap();

        // Mutate one character of the claims portion.
        let dot = token.find('.').unwrap();
        let mut bytes = token.clone().into_bytes();
        bytes[dot / 2] = if bytes[dot / 2] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            svc.decode(&tampered),
            Err(TokenError::InvalidSignature) | Err(TokenError::InvalidFormat)
        ));
    }

    #[test]
    fn decode_rejects_foreign_signer() {
        let issuing = service();
        let verifying = service();
        let token = issuing.issue("s", "r", Duration::seconds(60)).unwrap();
        assert_eq!(verifying.decode(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn decode_rejects_malformed_structure() {
        let svc = service();
        assert_eq!(svc.decode(""), Err(TokenError::InvalidFormat));
        assert_eq!(svc.decode("no-separator"), Err(TokenError::InvalidFormat));
        assert_eq!(svc.decode("a.b.c"), Err(TokenError::InvalidFormat));
        assert_eq!(svc.decode("!!.!!"), Err(TokenError::InvalidFormat));
    }

    #[test]
    fn decode_does_not_check_expiry() {
        let svc = service();
        let issued = Utc::now() - Duration::hours(2);
        let token = svc
            .issue_at("s", "r", Duration::seconds(30), issued)
            .unwrap();

        // Naturally expired, but decode still yields the claims so the
        // caller can compute remaining lifetime.
        let claims = svc.decode(&token).unwrap();
        assert!(claims.is_expired(Utc::now()));
        assert!(claims.remaining(Utc::now()) < Duration::zero());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let claims = SessionClaims {
            subject_id: "s".to_string(),
            role: "r".to_string(),
            issued_at: now,
            expires_at: now + Duration::seconds(60),
        };
        assert!(!claims.is_expired(now + Duration::seconds(59)));
        assert!(claims.is_expired(now + Duration::seconds(60)));
        assert!(claims.is_expired(now + Duration::seconds(61)));
    }
}
