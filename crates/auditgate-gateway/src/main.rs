//! auditgate gateway binary.
//!
//! Loads the YAML config (path from `AUDITGATE_CONFIG`), compiles the ACL,
//! and serves unary calls plus the `Logging`/`Statistics` streams. On ctrl-c
//! the event bus is shut down so every open stream terminates before exit.

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use auditgate_core::error::{AuditError, Result};
use auditgate_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = config::config_path();
    let cfg = config::load_from_file(&path)?;
    let state = app_state::AppState::new(cfg)?;
    let listen: SocketAddr = state
        .cfg()
        .gateway
        .listen
        .parse()
        .map_err(|e| AuditError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}")))?;

    let bus = state.bus();
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "auditgate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| AuditError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("ctrl-c handler failed: {e}");
            }
            tracing::info!("shutdown requested");
            bus.shutdown_all().await;
        })
        .await
        .map_err(|e| AuditError::Internal(format!("server failed: {e}")))
}
