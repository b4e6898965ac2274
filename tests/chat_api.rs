//! Integration tests for the chat relay endpoint.
//!
//! These exercise the full `POST /api/chat` → validation → generateContent →
//! verbatim passthrough pipeline using a wiremock HTTP server instead of the
//! real Gemini API. The passthrough assertions compare raw body text, since
//! the relay must not reshape upstream payloads.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gemrelay::config::Config;
use gemrelay::gateway::GatewayState;
use gemrelay::providers::GeminiClient;

// ============================================================================
// Test Helpers
// ============================================================================

/// Relay config pointed at the given upstream, with short test timeouts.
fn test_config(upstream_url: &str) -> Config {
    let mut config = Config::default();
    config.upstream.base_url = upstream_url.to_string();
    config.upstream.list_timeout_secs = 1;
    config.upstream.generate_timeout_secs = 1;
    config
}

/// Start the relay on an ephemeral port and return its base URL.
async fn start_relay(config: Config) -> (String, broadcast::Sender<()>) {
    let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

    let state = GatewayState {
        client: GeminiClient::new(&config.upstream),
        config: Arc::new(config),
        shutdown_tx: shutdown_tx.clone(),
        start_time: std::time::Instant::now(),
        version: "test".to_string(),
    };

    let app = gemrelay::gateway::routes::build_routes(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await
            .unwrap();
    });

    (format!("http://127.0.0.1:{}", addr.port()), shutdown_tx)
}

async fn post_chat(relay: &str, body: serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{relay}/api/chat"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn malformed_body_returns_400() {
    let (relay, _shutdown) = start_relay(test_config("http://127.0.0.1:1")).await;

    let resp = reqwest::Client::new()
        .post(format!("{relay}/api/chat"))
        .header("Content-Type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Request body is required" }));
}

#[tokio::test]
async fn empty_model_returns_400() {
    let (relay, _shutdown) = start_relay(test_config("http://127.0.0.1:1")).await;

    let resp = post_chat(
        &relay,
        json!({ "model": "", "key": "k", "contents": [1] }),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "model is required" }));
}

#[tokio::test]
async fn missing_key_returns_400() {
    let (relay, _shutdown) = start_relay(test_config("http://127.0.0.1:1")).await;

    let resp = post_chat(&relay, json!({ "model": "gemini-pro", "contents": [1] })).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "key is required" }));
}

#[tokio::test]
async fn empty_contents_returns_400() {
    let (relay, _shutdown) = start_relay(test_config("http://127.0.0.1:1")).await;

    let resp = post_chat(
        &relay,
        json!({ "model": "gemini-pro", "key": "k", "contents": [] }),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "contents is required" }));
}

// ============================================================================
// Passthrough
// ============================================================================

#[tokio::test]
async fn success_body_is_relayed_verbatim() {
    let mock = MockServer::start().await;
    let upstream_body = r#"{"candidates":[{"content":{"parts":[{"text":"Hello!"}],"role":"model"},"finishReason":"STOP"}]}"#;

    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Hi" }] }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(upstream_body)
                .insert_header("Content-Type", "application/json"),
        )
        .expect(1)
        .mount(&mock)
        .await;

    let (relay, _shutdown) = start_relay(test_config(&mock.uri())).await;

    let resp = post_chat(
        &relay,
        json!({
            "model": "gemini-pro",
            "key": "test-key",
            "contents": [{ "role": "user", "parts": [{ "text": "Hi" }] }]
        }),
    )
    .await;

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(resp.text().await.unwrap(), upstream_body);
}

#[tokio::test]
async fn upstream_429_is_relayed_unmodified() {
    let mock = MockServer::start().await;
    let upstream_body =
        r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;

    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_string(upstream_body)
                .insert_header("Content-Type", "application/json"),
        )
        .mount(&mock)
        .await;

    let (relay, _shutdown) = start_relay(test_config(&mock.uri())).await;

    let resp = post_chat(
        &relay,
        json!({ "model": "gemini-pro", "key": "test-key", "contents": [1] }),
    )
    .await;

    // Raw body, not an extracted message: this path never reshapes errors.
    assert_eq!(resp.status(), 429);
    assert_eq!(resp.text().await.unwrap(), upstream_body);
}

// ============================================================================
// Transport Failures
// ============================================================================

#[tokio::test]
async fn upstream_timeout_maps_to_504() {
    let mock = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock)
        .await;

    let (relay, _shutdown) = start_relay(test_config(&mock.uri())).await;

    let resp = post_chat(
        &relay,
        json!({ "model": "gemini-pro", "key": "test-key", "contents": [1] }),
    )
    .await;

    assert_eq!(resp.status(), 504);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Request to Gemini API timed out" }));
}

#[tokio::test]
async fn connection_refusal_maps_to_502() {
    let unused = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = unused.local_addr().unwrap().port();
    drop(unused);

    let (relay, _shutdown) = start_relay(test_config(&format!("http://127.0.0.1:{port}"))).await;

    let resp = post_chat(
        &relay,
        json!({ "model": "gemini-pro", "key": "test-key", "contents": [1] }),
    )
    .await;

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Could not connect to Gemini API" }));
}
