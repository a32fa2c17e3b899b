use rollcall_core::RollcallConfig;
use std::{env, fs, path::PathBuf};

/// Load the configuration file. An explicitly configured path must exist;
/// the default path falls back to built-in defaults when absent.
pub fn load_config() -> anyhow::Result<RollcallConfig> {
    if let Ok(p) = env::var("ROLLCALL_SERVER_CONFIG") {
        let raw = fs::read_to_string(&p)?;
        let cfg: RollcallConfig = toml::from_str(&raw)?;
        return Ok(cfg);
    }

    let path = PathBuf::from("config.toml");
    if !path.exists() {
        tracing::info!("no config.toml found, using defaults");
        return Ok(RollcallConfig::default());
    }
    let raw = fs::read_to_string(&path)?;
    let cfg: RollcallConfig = toml::from_str(&raw)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_parses_with_defaults() {
        let cfg: RollcallConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.tokens.checkin_window_secs, 24 * 60 * 60);
        assert_eq!(cfg.revocation.floor_ttl_secs, 24 * 60 * 60);
        assert_eq!(
            cfg.revocation.on_unavailable,
            rollcall_core::UnavailablePolicy::FailOpen
        );
    }

    #[test]
    fn sections_override_defaults() {
        let cfg: RollcallConfig = toml::from_str(
            r#"
            [server]
            bind = "127.0.0.1:9999"

            [revocation]
            on_unavailable = "fail_closed"
            floor_ttl_secs = 3600

            [storage]
            backend = "postgres"
            database_url = "postgres://localhost/rollcall"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.bind, "127.0.0.1:9999");
        assert_eq!(
            cfg.revocation.on_unavailable,
            rollcall_core::UnavailablePolicy::FailClosed
        );
        assert_eq!(cfg.revocation.floor_ttl_secs, 3600);
        assert_eq!(cfg.storage.backend, rollcall_core::StorageBackend::Postgres);
    }
}
