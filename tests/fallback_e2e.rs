//! End-to-end: mock upstream <- proxy router <- reqwest client

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use sse_debug_proxy::{
    build_router,
    transport::{CollectingSink, Direction},
    AppConfig, ProxyState,
};

const CONTENT_STREAM: &str = "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n\
                              data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi there\"}}]}\n\n\
                              data: [DONE]\n\n";
const EMPTY_STREAM: &str = "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n\
                            data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n\
                            data: [DONE]\n\n";
const COMPLETION: &str = r#"{"id":"chatcmpl-1","object":"chat.completion","choices":[{"index":0,"message":{"role":"assistant","content":"Hi there"},"finish_reason":"stop"}]}"#;

/// What the mock upstream answers to streaming requests, and what it saw
#[derive(Default)]
struct MockState {
    stream_body: String,
    received: Vec<serde_json::Value>,
    hosts: Vec<String>,
}

type SharedMock = Arc<Mutex<MockState>>;

async fn mock_completions(State(state): State<SharedMock>, request: Request<Body>) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = to_bytes(request.into_body(), usize::MAX).await.unwrap_or_default();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    let wants_stream = json["stream"].as_bool().unwrap_or(false);

    let stream_body = {
        let mut state = state.lock().unwrap();
        state.received.push(json);
        state.hosts.push(host);
        state.stream_body.clone()
    };

    if wants_stream {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/event-stream")],
            stream_body,
        )
            .into_response()
    } else {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            COMPLETION,
        )
            .into_response()
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

struct Harness {
    proxy: SocketAddr,
    upstream: SocketAddr,
    mock: SharedMock,
    sink: CollectingSink,
}

async fn start(stream_body: &str) -> Harness {
    let mock: SharedMock = Arc::new(Mutex::new(MockState {
        stream_body: stream_body.to_string(),
        ..MockState::default()
    }));
    let upstream = serve(Router::new().fallback(mock_completions).with_state(mock.clone())).await;

    let mut config = AppConfig::default();
    config.upstream.url = format!("http://{}", upstream);
    config.upstream.timeout_seconds = 10;

    let sink = CollectingSink::new();
    let state = ProxyState::with_sink(config, Arc::new(sink.clone())).unwrap();
    let proxy = serve(build_router(state)).await;

    Harness {
        proxy,
        upstream,
        mock,
        sink,
    }
}

fn chat_request() -> serde_json::Value {
    serde_json::json!({
        "model": "test-model",
        "messages": [{"role": "user", "content": "hello"}],
        "stream": true
    })
}

#[tokio::test]
async fn empty_stream_is_replaced_by_sync_response() {
    let h = start(EMPTY_STREAM).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{}/v1/chat/completions", h.proxy))
        .json(&chat_request())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "application/json");
    assert_eq!(resp.text().await.unwrap(), COMPLETION);

    let mock = h.mock.lock().unwrap();
    assert_eq!(mock.received.len(), 2);
    assert_eq!(mock.received[0]["stream"], true);
    assert_eq!(mock.received[1]["stream"], false);
    assert_eq!(mock.received[0]["messages"], mock.received[1]["messages"]);
    assert!(mock.hosts.iter().all(|host| *host == h.upstream.to_string()));
}

#[tokio::test]
async fn content_stream_is_relayed_verbatim() {
    let h = start(CONTENT_STREAM).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{}/v1/chat/completions", h.proxy))
        .json(&chat_request())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/event-stream");
    assert_eq!(resp.bytes().await.unwrap(), CONTENT_STREAM.as_bytes());
    assert_eq!(h.mock.lock().unwrap().received.len(), 1);

    let records = h.sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].direction, Direction::Request);
    assert_eq!(records[0].ordinal, records[1].ordinal);
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    // Bind then drop to get a port nothing listens on
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();

    let mut config = AppConfig::default();
    config.upstream.url = format!("http://{}", closed);
    let proxy = serve(build_router(ProxyState::from_config(config).unwrap())).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{}/v1/chat/completions", proxy))
        .json(&chat_request())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
}

#[tokio::test]
async fn concurrent_requests_get_distinct_ordinals() {
    let h = start(CONTENT_STREAM).await;
    let client = reqwest::Client::new();

    let requests = (0..8).map(|_| {
        let client = client.clone();
        let url = format!("http://{}/v1/chat/completions", h.proxy);
        tokio::spawn(async move { client.post(url).json(&chat_request()).send().await.unwrap().status() })
    });
    for handle in requests.collect::<Vec<_>>() {
        assert_eq!(handle.await.unwrap(), 200);
    }

    let records = h.sink.records();
    assert_eq!(records.len(), 16);

    let request_ordinals: HashSet<u64> = records
        .iter()
        .filter(|r| r.direction == Direction::Request)
        .map(|r| r.ordinal)
        .collect();
    assert_eq!(request_ordinals, (1..=8).collect::<HashSet<u64>>());

    // every request record precedes its response record
    for ordinal in 1..=8u64 {
        let positions: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.ordinal == ordinal)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(positions.len(), 2);
        assert_eq!(records[positions[0]].direction, Direction::Request);
    }
}
