//! Axum router wiring.
//!
//! - `POST /rpc/{service}/{method}`: unary business calls
//! - `GET /rpc/{service}/{method}`: WebSocket observation streams
//! - `/healthz`, `/readyz`, `/metrics`: operational endpoints

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/rpc/:service/:method",
            post(transport::rpc::unary).get(transport::stream::stream_upgrade),
        )
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
