use rollcall_core::{RollcallConfig, StorageBackend};
use rollcall_revocation::{RedisTtlStore, RevocationStore};
use rollcall_runtime::{Authenticator, CheckinIssuer, RedemptionCoordinator};
use rollcall_store::{
    AttendanceStore, PgRoster, PostgresAttendanceStore, Roster, SqliteAttendanceStore,
    SqliteRoster,
};
use rollcall_token::{CheckinTokenService, SessionTokenService, Signer};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{env, fs, path::Path, sync::Arc, time::Duration};

/// Shared application state.
///
/// All external clients (Redis, database pool) are constructed here once
/// and injected into the collaborators; the token components never manage
/// connection lifecycle themselves.
pub struct AppState {
    pub cfg: RollcallConfig,
    pub authenticator: Authenticator,
    pub coordinator: RedemptionCoordinator,
    pub issuer: CheckinIssuer,
    pub store: Arc<dyn AttendanceStore>,
}

impl AppState {
    pub async fn init(cfg: &RollcallConfig) -> anyhow::Result<Self> {
        let signer = load_signer(cfg)?;

        let sessions = SessionTokenService::new(signer.clone());
        let checkin = Arc::new(CheckinTokenService::new(
            signer,
            cfg.tokens.checkin_namespace.clone(),
            chrono::Duration::seconds(cfg.tokens.checkin_window_secs as i64),
        ));

        let redis_client = Arc::new(redis::Client::open(cfg.revocation.url.as_str())?);
        let revocation = RevocationStore::new(
            Arc::new(RedisTtlStore::new(
                redis_client,
                Duration::from_millis(cfg.revocation.op_timeout_ms),
            )),
            Duration::from_secs(cfg.revocation.floor_ttl_secs),
        );

        let (store, roster) = build_storage(cfg).await?;
        let op_timeout = Duration::from_millis(cfg.storage.op_timeout_ms);

        Ok(Self {
            cfg: cfg.clone(),
            authenticator: Authenticator::new(
                sessions,
                Arc::new(revocation),
                cfg.revocation.on_unavailable,
            ),
            coordinator: RedemptionCoordinator::new(
                checkin.clone(),
                roster,
                store.clone(),
                op_timeout,
            ),
            issuer: CheckinIssuer::new(checkin, store.clone(), op_timeout),
            store,
        })
    }
}

fn load_signer(cfg: &RollcallConfig) -> anyhow::Result<Signer> {
    if let Ok(hex) = env::var("ROLLCALL_SIGNING_SECRET") {
        return Ok(Signer::from_hex(&hex)?);
    }
    if !cfg.tokens.signing_secret_hex.is_empty() {
        return Ok(Signer::from_hex(&cfg.tokens.signing_secret_hex)?);
    }
    tracing::warn!("no signing secret configured; using an ephemeral one");
    Ok(Signer::generate())
}

async fn build_storage(
    cfg: &RollcallConfig,
) -> anyhow::Result<(Arc<dyn AttendanceStore>, Arc<dyn Roster>)> {
    match cfg.storage.backend {
        StorageBackend::Postgres => {
            let pool = sqlx::PgPool::connect(&cfg.storage.database_url).await?;
            let store = PostgresAttendanceStore::with_pool(pool.clone());
            store.ensure_schema().await?;
            Ok((Arc::new(store), Arc::new(PgRoster::with_pool(pool))))
        }
        StorageBackend::Sqlite => {
            ensure_parent_dir(&cfg.storage.database_url)?;
            let options = SqliteConnectOptions::new()
                .filename(&cfg.storage.database_url)
                .create_if_missing(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?;
            let store = SqliteAttendanceStore::with_pool(pool.clone());
            store.ensure_schema().await?;
            Ok((Arc::new(store), Arc::new(SqliteRoster::with_pool(pool))))
        }
    }
}

fn ensure_parent_dir(file_path: &str) -> anyhow::Result<()> {
    let p = Path::new(file_path);
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
