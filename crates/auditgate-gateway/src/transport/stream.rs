//! Observation streams over WebSocket: `GET /rpc/main.Admin/Logging` and
//! `GET /rpc/main.Admin/Statistics?interval_seconds=N`.
//!
//! Interception happens before the upgrade, so a denied caller gets a plain
//! HTTP error and never subscribes. Each item is sent as one JSON text frame.

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, Path, Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use auditgate_core::error::{AuditError, Result};

use crate::app_state::AppState;
use crate::reporters::{run_logging, run_statistics, StreamSink};

use super::{call_meta, ApiError, LOGGING_METHOD, STATISTICS_METHOD};

#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
enum StreamKind {
    Logging,
    Statistics { interval_secs: u64 },
}

impl StreamKind {
    fn label(self) -> &'static str {
        match self {
            StreamKind::Logging => "logging",
            StreamKind::Statistics { .. } => "statistics",
        }
    }
}

/// Outbound half of the socket, serializing items as JSON text frames.
struct WsSink {
    tx: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl<T: Serialize + Send + 'static> StreamSink<T> for WsSink {
    async fn send(&mut self, item: T) -> Result<()> {
        let text = serde_json::to_string(&item)
            .map_err(|e| AuditError::Internal(format!("json encode failed: {e}")))?;
        self.tx
            .send(Message::Text(text))
            .await
            .map_err(|e| AuditError::Transport(e.to_string()))
    }
}

pub async fn stream_upgrade(
    State(app): State<AppState>,
    Path((service, method)): Path<(String, String)>,
    Query(q): Query<StreamQuery>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let call = call_meta(&service, &method, &headers, peer);
    if call.method != LOGGING_METHOD && call.method != STATISTICS_METHOD {
        return ApiError(AuditError::NotFound(call.method)).into_response();
    }

    let is_statistics = call.method == STATISTICS_METHOD;
    let interceptor = app.interceptor();
    let upgraded = interceptor
        .intercept(&call, || async move {
            let kind = if is_statistics {
                match q.interval_seconds {
                    Some(n) if n > 0 => StreamKind::Statistics { interval_secs: n },
                    _ => {
                        return Err(AuditError::BadRequest(
                            "interval_seconds must be a positive integer".into(),
                        ))
                    }
                }
            } else {
                StreamKind::Logging
            };
            Ok(ws.on_upgrade(move |socket| run_stream(app, kind, socket)))
        })
        .await;

    match upgraded {
        Ok(resp) => resp,
        Err(e) => ApiError(e).into_response(),
    }
}

async fn run_stream(app: AppState, kind: StreamKind, socket: WebSocket) {
    let (tx, mut rx) = socket.split();
    let mut sink = WsSink { tx };

    // Resolves once the caller closes or the socket errors out.
    let cancelled = async move {
        while let Some(Ok(msg)) = rx.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    };

    let metrics = app.metrics();
    let labels = [("stream", kind.label())];
    metrics.active_streams.inc(&labels);

    let bus = app.bus();
    let res = match kind {
        StreamKind::Logging => run_logging(&bus, &mut sink, cancelled).await,
        StreamKind::Statistics { interval_secs } => {
            run_statistics(bus, interval_secs, &mut sink, cancelled).await
        }
    };

    metrics.active_streams.dec(&labels);
    if let Err(e) = res {
        tracing::warn!(stream = kind.label(), "stream failed to start: {e}");
    }
    let _ = sink.tx.close().await;
}
