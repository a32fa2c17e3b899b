//! Configuration types for the Rollcall token core.
//!
//! The full tree is loaded from a single TOML file by the server binary;
//! every section has serde defaults so a minimal config stays minimal.

pub mod revocation;
pub mod server;
pub mod storage;
pub mod sweeper;
pub mod tokens;

use serde::{Deserialize, Serialize};

pub use revocation::{RevocationConfig, UnavailablePolicy};
pub use server::ServerConfig;
pub use storage::{StorageBackend, StorageConfig};
pub use sweeper::SweeperConfig;
pub use tokens::TokenConfig;

/// Complete Rollcall configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RollcallConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tokens: TokenConfig,

    #[serde(default)]
    pub revocation: RevocationConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub sweeper: SweeperConfig,
}
