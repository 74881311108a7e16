//! HTTP + WebSocket surface, served on an ephemeral listener.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use auditgate_core::{Event, StatSnapshot};
use auditgate_gateway::app_state::AppState;
use auditgate_gateway::bus::{EventBus, Subscription};
use auditgate_gateway::{config, router};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CONFIG: &str = r#"
version: 1
bus:
  queue_capacity: 8
acl:
  logger: ["/main.Admin/Logging"]
  stat: ["/main.Admin/Statistics"]
  biz_user: ["/main.Biz/Check", "/main.Biz/Add"]
  biz_admin: ["/main.Biz/*"]
"#;

async fn serve() -> (SocketAddr, AppState) {
    let state = AppState::new(config::load_from_str(CONFIG).unwrap()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router::build_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });
    (addr, state)
}

async fn post(addr: SocketAddr, method: &str, consumer: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut req = reqwest::Client::new()
        .post(format!("http://{addr}/rpc/{method}"))
        .body(body.to_string());
    if let Some(c) = consumer {
        req = req.header("consumer", c);
    }
    let resp = req.send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn ws_connect(addr: SocketAddr, path: &str, consumer: &str) -> Result<Ws, tungstenite::Error> {
    let mut req = format!("ws://{addr}{path}").into_client_request().unwrap();
    req.headers_mut().insert("consumer", consumer.parse().unwrap());
    tokio_tungstenite::connect_async(req).await.map(|(ws, _)| ws)
}

fn rejected_status(res: Result<Ws, tungstenite::Error>) -> u16 {
    match res {
        Err(tungstenite::Error::Http(resp)) => resp.status().as_u16(),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("upgrade must be rejected"),
    }
}

async fn next_json(ws: &mut Ws) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("no frame in time")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn recv(sub: &mut Subscription) -> Event {
    timeout(Duration::from_secs(1), sub.recv()).await.unwrap().unwrap()
}

async fn wait_for_subscribers(bus: &Arc<EventBus>, n: usize) {
    timeout(Duration::from_secs(2), async {
        while bus.subscriber_count().await != n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("subscriber count did not settle");
}

#[tokio::test]
async fn allowed_unary_call_records_consumer_and_peer() {
    let (addr, state) = serve().await;
    let mut sub = state.bus().subscribe().await.unwrap();

    let (status, body) = post(addr, "main.Biz/Check", Some("biz_user"), "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let ev = recv(&mut sub).await;
    assert_eq!(ev.method, "/main.Biz/Check");
    assert_eq!(ev.consumer, "biz_user");
    assert!(ev.host.starts_with("127.0.0.1:"), "host = {}", ev.host);
}

#[tokio::test]
async fn denied_unary_call_is_403_and_audited() {
    let (addr, state) = serve().await;
    let mut sub = state.bus().subscribe().await.unwrap();

    let (status, body) = post(addr, "main.Biz/Test", Some("biz_user"), "").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "ACCESS_DENIED");
    assert_eq!(recv(&mut sub).await.method, "/main.Biz/Test");

    let (status, _) = post(addr, "main.Biz/Check", None, "").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(recv(&mut sub).await.consumer, "");
}

#[tokio::test]
async fn unknown_method_is_404_without_audit() {
    let (addr, state) = serve().await;
    let bus = state.bus();
    let mut sub = bus.subscribe().await.unwrap();

    let (status, body) = post(addr, "main.Biz/Nope", Some("biz_admin"), "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    bus.publish(Event::now("marker", "", "")).await.unwrap();
    assert_eq!(recv(&mut sub).await.method, "marker");
}

#[tokio::test]
async fn malformed_body_is_400() {
    let (addr, _state) = serve().await;
    let (status, body) = post(addr, "main.Biz/Check", Some("biz_user"), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn closed_bus_is_503() {
    let (addr, state) = serve().await;
    state.bus().shutdown_all().await;

    let (status, body) = post(addr, "main.Biz/Check", Some("biz_user"), "").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "UNAVAILABLE");

    let ready = reqwest::get(format!("http://{addr}/readyz")).await.unwrap();
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn logging_stream_forwards_calls() {
    let (addr, state) = serve().await;
    let bus = state.bus();

    let mut ws = ws_connect(addr, "/rpc/main.Admin/Logging", "logger").await.unwrap();
    wait_for_subscribers(&bus, 1).await;

    let (status, _) = post(addr, "main.Biz/Add", Some("biz_admin"), "").await;
    assert_eq!(status, StatusCode::OK);

    let ev: Event = serde_json::from_value(next_json(&mut ws).await).unwrap();
    assert_eq!(ev.method, "/main.Biz/Add");
    assert_eq!(ev.consumer, "biz_admin");

    ws.close(None).await.unwrap();
    wait_for_subscribers(&bus, 0).await;
}

#[tokio::test]
async fn logging_stream_denied_for_other_consumer() {
    let (addr, state) = serve().await;
    let res = ws_connect(addr, "/rpc/main.Admin/Logging", "biz_user").await;
    assert_eq!(rejected_status(res), 403);
    assert_eq!(state.bus().subscriber_count().await, 0);
}

#[tokio::test]
async fn statistics_interval_checked_after_audit() {
    let (addr, state) = serve().await;
    let mut sub = state.bus().subscribe().await.unwrap();

    for path in [
        "/rpc/main.Admin/Statistics?interval_seconds=0",
        "/rpc/main.Admin/Statistics",
    ] {
        let res = ws_connect(addr, path, "stat").await;
        assert_eq!(rejected_status(res), 400);
        let ev = recv(&mut sub).await;
        assert_eq!(ev.method, "/main.Admin/Statistics");
        assert_eq!(ev.consumer, "stat");
    }
}

#[tokio::test]
async fn statistics_stream_emits_snapshots() {
    let (addr, state) = serve().await;
    let bus = state.bus();

    let mut ws = ws_connect(addr, "/rpc/main.Admin/Statistics?interval_seconds=1", "stat")
        .await
        .unwrap();
    wait_for_subscribers(&bus, 1).await;

    let (status, _) = post(addr, "main.Biz/Check", Some("biz_user"), "").await;
    assert_eq!(status, StatusCode::OK);

    let mut found = false;
    for _ in 0..3 {
        let snap: StatSnapshot = serde_json::from_value(next_json(&mut ws).await).unwrap();
        if snap.by_method.get("/main.Biz/Check") == Some(&1) {
            assert_eq!(snap.by_consumer.get("biz_user"), Some(&1));
            found = true;
            break;
        }
    }
    assert!(found, "call never showed up in a snapshot");
}

#[tokio::test]
async fn unknown_stream_method_is_404() {
    let (addr, _state) = serve().await;
    let res = ws_connect(addr, "/rpc/main.Biz/Check", "biz_user").await;
    assert_eq!(rejected_status(res), 404);
}

#[tokio::test]
async fn metrics_report_config_and_calls() {
    let (addr, state) = serve().await;
    assert_eq!(state.cfg().bus.queue_capacity, 8);

    post(addr, "main.Biz/Check", Some("biz_user"), "").await;
    let text = reqwest::get(format!("http://{addr}/metrics"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(text.contains("auditgate_acl_consumers 4"));
    assert!(text.contains("auditgate_bus_subscribers 0"));
    assert!(text.contains("decision=\"allowed\""));
}
