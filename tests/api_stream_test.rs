//! API client tests against a real HTTP server using wiremock.
//!
//! These exercise the reqwest transport, the bearer header, status
//! handling and streamed event decoding end to end.

use chatstream::adapters::{FileSessionStore, ReqwestHttpClient};
use chatstream::api::ApiClient;
use chatstream::config::ClientConfig;
use chatstream::error::ApiError;
use chatstream::models::{ChatRequest, User};
use chatstream::sse::{ChatEvent, ChatEventKind};
use chatstream::traits::{Session, SessionStore};
use futures::StreamExt;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a test token.
fn test_token() -> String {
    "test-auth-token".to_string()
}

/// Client pointed at the mock server with a signed-in session on disk.
async fn signed_in_client(
    server: &MockServer,
    dir: &TempDir,
) -> ApiClient<ReqwestHttpClient, FileSessionStore> {
    let store = FileSessionStore::new(dir.path().join("session.json"));
    store
        .save(&Session::new(Some(test_token()), Some(User::new("1", "ada"))))
        .await
        .unwrap();

    let config = ClientConfig::default().with_base_url(format!("{}/api", server.uri()));
    ApiClient::new(ReqwestHttpClient::new(), store, config)
}

fn sse_body(frames: &[&str]) -> String {
    frames.iter().map(|f| format!("data: {}\n\n", f)).collect()
}

#[tokio::test]
async fn test_stream_sends_bearer_and_decodes_events() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let body = sse_body(&[
        r#"{"type":"content","content":"Hello"}"#,
        r#"{"type":"content","content":", 世界"}"#,
        r#"{"type":"done"}"#,
    ]);

    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .and(header("Authorization", format!("Bearer {}", test_token()).as_str()))
        .and(header("Content-Type", "application/json"))
        .and(body_json(serde_json::json!({"message": "hi", "conversation_id": "7"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server, &dir).await;
    let events: Vec<ChatEvent> = client
        .send_message_stream(&ChatRequest::new("hi").in_conversation("7"))
        .await
        .expect("stream should open")
        .map(|item| item.expect("no transport error"))
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    let text: String = events
        .iter()
        .filter_map(|e| e.content.as_deref())
        .collect();
    assert_eq!(text, "Hello, 世界");
    assert_eq!(events[2].kind(), ChatEventKind::Done);
}

#[tokio::test]
async fn test_stream_skips_comments_and_malformed_frames() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let body = ": keep-alive\n\ndata: {broken\n\ndata: {\"type\":\"content\",\"content\":\"ok\"}\n\nevent: noise\n";

    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = signed_in_client(&server, &dir).await;
    let events: Vec<ChatEvent> = client
        .send_message_stream(&ChatRequest::new("hi"))
        .await
        .unwrap()
        .filter_map(|item| async move { item.ok() })
        .collect()
        .await;

    assert_eq!(events, vec![ChatEvent::content("ok")]);
}

#[tokio::test]
async fn test_stream_error_status_fails_before_decoding() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/chat/stream"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let client = signed_in_client(&server, &dir).await;
    let err = client
        .send_message_stream(&ChatRequest::new("hi"))
        .await
        .err()
        .expect("503 must fail");

    assert_eq!(err.status(), Some(503));
    assert!(err.is_retryable());
    // Session untouched by non-401 failures
    assert!(client.session_store().load().await.unwrap().is_some());
}

#[tokio::test]
async fn test_unauthorized_clears_session_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "token expired"
        })))
        .mount(&server)
        .await;

    let client = signed_in_client(&server, &dir).await;
    let result = client.list_conversations().await;

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert!(!client.session_store().path().exists());
}

#[tokio::test]
async fn test_conversation_round_trip() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/conversations"))
        .and(body_json(serde_json::json!({"title": "Trip plans"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 11,
            "title": "Trip plans",
            "messages": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/conversations/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 11,
            "title": "Trip plans",
            "messages": [{"id": 1, "role": "user", "content": "Where to?"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/conversations/11"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server, &dir).await;

    let created = client.create_conversation("Trip plans").await.unwrap();
    assert_eq!(created.id, "11");

    let loaded = client.get_conversation(&created.id).await.unwrap();
    assert_eq!(loaded.messages.len(), 1);
    assert_eq!(loaded.messages[0].content, "Where to?");

    client.delete_conversation(&created.id).await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().join("session.json"));
    let config = ClientConfig::default().with_base_url("http://127.0.0.1:1/api");
    let client = ApiClient::new(ReqwestHttpClient::new(), store, config);

    let err = client.current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
