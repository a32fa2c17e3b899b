//! Revocation side-channel configuration.

use serde::{Deserialize, Serialize};

/// Behavior when the revocation store is unreachable during a check.
///
/// Fail-open favors availability: the request proceeds and the degraded
/// check is logged. Fail-closed denies until the store is reachable again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnavailablePolicy {
    #[default]
    FailOpen,
    FailClosed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationConfig {
    /// Redis connection URL for the revocation store.
    #[serde(default = "default_url")]
    pub url: String,

    /// Minimum retention for a revocation record, in seconds, regardless of
    /// the token's remaining lifetime. A revocation may therefore outlive
    /// the token's natural expiry; this margin covers clock skew between
    /// the issuer and the store and is deliberate, not inherited.
    #[serde(default = "default_floor_ttl_secs")]
    pub floor_ttl_secs: u64,

    /// Policy when the store is unreachable on the request hot path.
    #[serde(default)]
    pub on_unavailable: UnavailablePolicy,

    /// Per-operation timeout for store calls, in milliseconds.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

fn default_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_floor_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_op_timeout_ms() -> u64 {
    250
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            floor_ttl_secs: default_floor_ttl_secs(),
            on_unavailable: UnavailablePolicy::default(),
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}
