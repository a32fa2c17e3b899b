//! Token issuance configuration.

use serde::{Deserialize, Serialize};

/// Configuration for session and check-in token issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Hex-encoded server signing secret. When empty, the server generates
    /// an ephemeral secret at startup (tokens do not survive restarts).
    /// Prefer setting env var `ROLLCALL_SIGNING_SECRET`.
    #[serde(default)]
    pub signing_secret_hex: String,

    /// Default session token lifetime in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Fixed validity window for check-in tokens, in seconds, measured
    /// from `issued_at`.
    #[serde(default = "default_checkin_window_secs")]
    pub checkin_window_secs: u64,

    /// Namespace prefix embedded in check-in token payloads.
    #[serde(default = "default_checkin_namespace")]
    pub checkin_namespace: String,
}

fn default_session_ttl_secs() -> u64 {
    8 * 60 * 60
}

fn default_checkin_window_secs() -> u64 {
    24 * 60 * 60
}

fn default_checkin_namespace() -> String {
    "rollcall".to_string()
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            signing_secret_hex: String::new(),
            session_ttl_secs: default_session_ttl_secs(),
            checkin_window_secs: default_checkin_window_secs(),
            checkin_namespace: default_checkin_namespace(),
        }
    }
}
