//! Operational HTTP endpoints (not audited, not ACL-checked).
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 once the event bus is shut down)
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.bus().is_closed() {
        (StatusCode::SERVICE_UNAVAILABLE, "shutting down")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let subscribers = state.bus().subscriber_count().await as u64;
    let consumers = state.policy().consumers().count() as u64;
    state.metrics().render(&[
        ("auditgate_bus_subscribers", subscribers),
        ("auditgate_acl_consumers", consumers),
    ])
}
