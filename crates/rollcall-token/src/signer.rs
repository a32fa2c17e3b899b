//! Keyed payload signing.

use crate::error::TokenError;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SECRET_LEN_BYTES: usize = 32;

/// Signs and verifies byte payloads with HMAC-SHA256.
///
/// The signer is the single component holding the server secret. Signing is
/// deterministic; verification is constant-time and returns `false` for any
/// malformed input rather than erroring.
#[derive(Clone)]
pub struct Signer {
    secret: Vec<u8>,
}

impl Signer {
    /// Create a signer from raw secret bytes.
    pub fn new(secret: Vec<u8>) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret("empty secret".to_string()));
        }
        Ok(Self { secret })
    }

    /// Create a signer from a hex-encoded secret string.
    pub fn from_hex(secret_hex: &str) -> Result<Self, TokenError> {
        let bytes = hex::decode(secret_hex.trim())
            .map_err(|e| TokenError::InvalidSecret(e.to_string()))?;
        Self::new(bytes)
    }

    /// Generate a signer with a random secret. Tokens signed with it do not
    /// survive process restarts.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut bytes = vec![0u8; SECRET_LEN_BYTES];
        rng.fill_bytes(&mut bytes);
        Self { secret: bytes }
    }

    /// Hex encoding of the secret, for persisting a generated one.
    pub fn secret_hex(&self) -> String {
        hex::encode(&self.secret)
    }

    /// Compute the signature over a payload.
    pub fn sign(&self, payload: &[u8]) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(payload);
        mac.finalize().into_bytes().into()
    }

    /// Check a signature against a payload in constant time.
    ///
    /// Returns `false` for signatures of the wrong length or any mismatch;
    /// never errors.
    pub fn verify(&self, payload: &[u8], signature: &[u8]) -> bool {
        let expected = self.sign(payload);
        if signature.len() != expected.len() {
            return false;
        }
        expected.as_slice().ct_eq(signature).into()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the secret through Debug output.
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_deterministic() {
        let signer = Signer::generate();
        assert_eq!(signer.sign(b"payload"), signer.sign(b"payload"));
        assert_ne!(signer.sign(b"payload"), signer.sign(b"payloae"));
    }

    #[test]
    fn verify_accepts_valid_and_rejects_mutated() {
        let signer = Signer::generate();
        let sig = signer.sign(b"hello");
        assert!(signer.verify(b"hello", &sig));
        assert!(!signer.verify(b"hellp", &sig));

        let mut bad = sig;
        bad[0] ^= 0x01;
        assert!(!signer.verify(b"hello", &bad));
    }

    #[test]
    fn verify_rejects_wrong_length_without_panicking() {
        let signer = Signer::generate();
        assert!(!signer.verify(b"hello", b""));
        assert!(!signer.verify(b"hello", b"short"));
    }

    #[test]
    fn different_secrets_produce_different_signatures() {
        let a = Signer::generate();
        let b = Signer::generate();
        assert_ne!(a.sign(b"payload"), b.sign(b"payload"));
    }

    #[test]
    fn hex_roundtrip() {
        let signer = Signer::generate();
        let restored = Signer::from_hex(&signer.secret_hex()).unwrap();
        assert_eq!(signer.sign(b"x"), restored.sign(b"x"));
    }

    #[test]
    fn rejects_bad_secrets() {
        assert!(Signer::from_hex("not hex").is_err());
        assert!(Signer::new(Vec::new()).is_err());
    }
}
