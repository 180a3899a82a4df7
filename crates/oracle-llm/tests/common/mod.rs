//! Shared helpers for backend tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use oracle_core::{ConsultationRequest, IdentityKey};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn recon_request() -> ConsultationRequest {
    ConsultationRequest::new(
        IdentityKey::new("u1"),
        Some("example.com".to_string()),
        Some("recon".to_string()),
        Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap(),
        0,
    )
}

pub fn short_timeout() -> Duration {
    Duration::from_millis(300)
}

/// Server answering `route` with `body` and `status`
pub async fn mock_server(route: &str, status: u16, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

/// Server that answers well after `short_timeout`
pub async fn slow_server(route: &str, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    server
}

/// Server whose 200 response is not JSON
pub async fn garbage_server(route: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>teapot</html>"))
        .mount(&server)
        .await;
    server
}

/// A url nothing listens on
pub fn dead_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn ollama_reply(text: &str) -> serde_json::Value {
    json!({ "model": "llama3", "response": text, "done": true })
}

pub fn chat_reply(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": text }, "finish_reason": "stop" }]
    })
}

pub fn anthropic_reply(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    })
}
