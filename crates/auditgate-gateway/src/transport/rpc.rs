//! Unary calls: `POST /rpc/{service}/{method}` with a JSON body.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use auditgate_core::error::{AuditError, Result};

use crate::app_state::AppState;

use super::{call_meta, ApiError};

fn decode_body(body: &Bytes) -> Result<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| AuditError::BadRequest(format!("invalid json body: {e}")))
}

pub async fn unary(
    State(app): State<AppState>,
    Path((service, method)): Path<(String, String)>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let call = call_meta(&service, &method, &headers, peer);

    // Unknown methods never reach the interceptor, as with an RPC router.
    let dispatcher = app.dispatcher();
    if !dispatcher.has_method(&call.method) {
        return ApiError(AuditError::NotFound(call.method)).into_response();
    }

    let body = match decode_body(&body) {
        Ok(v) => v,
        Err(e) => return ApiError(e).into_response(),
    };

    let interceptor = app.interceptor();
    match interceptor
        .intercept(&call, || dispatcher.dispatch(&call, body))
        .await
    {
        Ok(v) => Json(v).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}
