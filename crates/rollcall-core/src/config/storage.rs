//! Attendance storage configuration.

use serde::{Deserialize, Serialize};

/// Which persistence backend to run against. Both provide the same
/// storage interface; each brings its own transactional semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Connection URL for Postgres, or a file path for SQLite.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Per-operation timeout for storage and roster calls, in milliseconds.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

fn default_database_url() -> String {
    "data/rollcall.sqlite".to_string()
}

fn default_op_timeout_ms() -> u64 {
    2_000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: default_database_url(),
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}
