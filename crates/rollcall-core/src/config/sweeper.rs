//! Expiry sweeper configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Whether the background sweeper runs at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Interval between sweep passes, in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    15 * 60
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval_secs(),
        }
    }
}
