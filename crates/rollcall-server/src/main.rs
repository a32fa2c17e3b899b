use rollcall_runtime::ExpirySweeper;
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;

mod config;
mod routes;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let cfg = config::load_config()?;
    let state = Arc::new(state::AppState::init(&cfg).await?);

    let sweeper_handle = if cfg.sweeper.enabled {
        let sweeper = ExpirySweeper::new(
            state.store.clone(),
            chrono::Duration::seconds(cfg.tokens.checkin_window_secs as i64),
            Duration::from_secs(cfg.sweeper.interval_secs),
        );
        Some(sweeper.spawn())
    } else {
        tracing::info!("expiry sweeper disabled by config");
        None
    };

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let addr = cfg.server.bind.clone();
    tracing::info!("rollcall-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper_handle {
        handle.abort();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
