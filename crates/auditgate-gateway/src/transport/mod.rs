//! Transport layer (HTTP unary calls + WebSocket observation streams).
//!
//! Both paths build a [`CallMeta`] and go through the interceptor before any
//! handler runs. Errors are rendered as `{"code": ..., "msg": ...}` JSON.

pub mod rpc;
pub mod stream;

use std::net::SocketAddr;

use axum::{
    extract::ConnectInfo,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use auditgate_core::error::{AuditError, ClientCode};

use crate::intercept::CallMeta;

/// Metadata key carrying the caller identity.
pub const CONSUMER_HEADER: &str = "consumer";

pub const ADMIN_PREFIX: &str = "/main.Admin/";
pub const LOGGING_METHOD: &str = "/main.Admin/Logging";
pub const STATISTICS_METHOD: &str = "/main.Admin/Statistics";

/// Build call metadata from the routed `service`/`method` pair.
pub fn call_meta(
    service: &str,
    method: &str,
    headers: &HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> CallMeta {
    let consumer = headers
        .get(CONSUMER_HEADER)
        .and_then(|v| v.to_str().ok());
    CallMeta::new(format!("/{service}/{method}"), consumer, peer.map(|c| c.0))
}

/// HTTP rendering of `AuditError`.
pub struct ApiError(pub AuditError);

impl From<AuditError> for ApiError {
    fn from(e: AuditError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
            ClientCode::AccessDenied => StatusCode::FORBIDDEN,
            ClientCode::NotFound => StatusCode::NOT_FOUND,
            ClientCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "code": code.as_str(), "msg": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}
