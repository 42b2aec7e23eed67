use devdeck::inference::{
    ChatProvider, ChatSession, GeminiProvider, OpenRouterProvider, ProviderError, StreamChunk,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

const SYSTEM: &str = "You are a test assistant.";

// ============================================================================
// Helper Functions
// ============================================================================

/// Sends one prompt and collects everything the session put on the channel.
async fn send(
    session: &Arc<dyn ChatSession>,
    prompt: &str,
) -> (Result<(), ProviderError>, Vec<StreamChunk>) {
    let (tx, mut rx) = mpsc::channel(100);
    let result = session.send_prompt(prompt, tx).await;
    let mut chunks = Vec::new();
    while let Some(chunk) = rx.recv().await {
        chunks.push(chunk);
    }
    (result, chunks)
}

fn content_of(chunks: &[StreamChunk]) -> String {
    chunks
        .iter()
        .filter_map(|c| match c {
            StreamChunk::Content(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

fn sse_body(events: &[&str]) -> String {
    events.iter().map(|e| format!("data: {e}\n\n")).collect()
}

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

// ============================================================================
// Gemini Provider Tests
// ============================================================================

fn gemini_session(server: &MockServer) -> Arc<dyn ChatSession> {
    GeminiProvider::new(
        "test-key".to_string(),
        "test-model".to_string(),
        Some(server.uri()),
    )
    .open_session(SYSTEM)
}

fn gemini_mock() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/models/test-model:streamGenerateContent"))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", "test-key"))
}

#[tokio::test]
async fn test_gemini_streams_fragments_in_order() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        r#"{"candidates":[{"content":{"parts":[{"text":"Hel"}],"role":"model"}}]}"#,
        r#"{"candidates":[{"content":{"parts":[{"text":"lo, "}],"role":"model"}}]}"#,
        r#"{"candidates":[{"content":{"parts":[{"text":"world"}],"role":"model"},"finishReason":"STOP"}]}"#,
    ]);
    gemini_mock()
        .respond_with(sse_response(body))
        .expect(1)
        .mount(&server)
        .await;

    let session = gemini_session(&server);
    let (result, chunks) = send(&session, "greet me").await;

    assert_ok!(result);
    assert_eq!(
        chunks,
        vec![
            StreamChunk::Content("Hel".to_string()),
            StreamChunk::Content("lo, ".to_string()),
            StreamChunk::Content("world".to_string()),
            StreamChunk::Completed,
        ]
    );

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0]["systemInstruction"]["parts"][0]["text"], SYSTEM);
    assert_eq!(bodies[0]["contents"][0]["role"], "user");
    assert_eq!(bodies[0]["contents"][0]["parts"][0]["text"], "greet me");
}

#[tokio::test]
async fn test_gemini_session_carries_history() {
    let server = MockServer::start().await;
    gemini_mock()
        .respond_with(sse_response(sse_body(&[
            r#"{"candidates":[{"content":{"parts":[{"text":"first reply"}]},"finishReason":"STOP"}]}"#,
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    gemini_mock()
        .respond_with(sse_response(sse_body(&[
            r#"{"candidates":[{"content":{"parts":[{"text":"second reply"}]},"finishReason":"STOP"}]}"#,
        ])))
        .mount(&server)
        .await;

    let session = gemini_session(&server);
    let (first, chunks) = send(&session, "one").await;
    assert_ok!(first);
    assert_eq!(content_of(&chunks), "first reply");
    let (second, chunks) = send(&session, "two").await;
    assert_ok!(second);
    assert_eq!(content_of(&chunks), "second reply");

    let bodies = request_bodies(&server).await;
    let contents = bodies[1]["contents"].as_array().unwrap();
    let turns: Vec<(&str, &str)> = contents
        .iter()
        .map(|c| {
            (
                c["role"].as_str().unwrap(),
                c["parts"][0]["text"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        turns,
        vec![("user", "one"), ("model", "first reply"), ("user", "two")]
    );
}

#[tokio::test]
async fn test_gemini_http_error_is_api_error() {
    let server = MockServer::start().await;
    gemini_mock()
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#,
        ))
        .mount(&server)
        .await;

    let session = gemini_session(&server);
    let (result, chunks) = send(&session, "hi").await;

    match assert_err!(result) {
        ProviderError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid.");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(chunks.is_empty());
}

#[tokio::test]
async fn test_gemini_error_inside_stream_keeps_partial_content() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        r#"{"candidates":[{"content":{"parts":[{"text":"partial"}]}}]}"#,
        r#"{"error":{"code":503,"message":"overloaded"}}"#,
    ]);
    gemini_mock().respond_with(sse_response(body)).mount(&server).await;

    let session = gemini_session(&server);
    let (result, chunks) = send(&session, "hi").await;

    assert!(matches!(
        assert_err!(result),
        ProviderError::Api { status: 503, .. }
    ));
    assert_eq!(chunks, vec![StreamChunk::Content("partial".to_string())]);
}

#[tokio::test]
async fn test_gemini_blocked_prompt_is_api_error() {
    let server = MockServer::start().await;
    let body = sse_body(&[r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#]);
    gemini_mock().respond_with(sse_response(body)).mount(&server).await;

    let session = gemini_session(&server);
    let (result, _) = send(&session, "hi").await;

    match assert_err!(result) {
        ProviderError::Api { message, .. } => assert!(message.contains("SAFETY")),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_gemini_stream_without_finish_reason_is_incomplete() {
    let server = MockServer::start().await;
    let body = sse_body(&[r#"{"candidates":[{"content":{"parts":[{"text":"cut"}]}}]}"#]);
    gemini_mock().respond_with(sse_response(body)).mount(&server).await;

    let session = gemini_session(&server);
    let (result, chunks) = send(&session, "hi").await;

    assert!(matches!(assert_err!(result), ProviderError::Incomplete));
    assert_eq!(chunks, vec![StreamChunk::Content("cut".to_string())]);
}

#[tokio::test]
async fn test_gemini_failed_turn_is_not_remembered() {
    let server = MockServer::start().await;
    gemini_mock()
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    gemini_mock()
        .respond_with(sse_response(sse_body(&[
            r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]},"finishReason":"STOP"}]}"#,
        ])))
        .mount(&server)
        .await;

    let session = gemini_session(&server);
    let (first, _) = send(&session, "lost").await;
    assert_err!(first);
    let (second, _) = send(&session, "kept").await;
    assert_ok!(second);

    let bodies = request_bodies(&server).await;
    let contents = bodies[1]["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0]["parts"][0]["text"], "kept");
}

// ============================================================================
// OpenRouter Provider Tests
// ============================================================================

fn openrouter_session(server: &MockServer) -> Arc<dyn ChatSession> {
    OpenRouterProvider::new(
        "test-key".to_string(),
        "test-model".to_string(),
        Some(server.uri()),
    )
    .open_session(SYSTEM)
}

fn openrouter_mock() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("authorization", "Bearer test-key"))
}

#[tokio::test]
async fn test_openrouter_streams_deltas_until_completed() {
    let server = MockServer::start().await;
    let body = "\
event: response.created
data: {\"type\":\"response.created\"}

event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\"Hello\"}

event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\" world\"}

event: response.completed
data: {\"type\":\"response.completed\"}
";
    openrouter_mock()
        .respond_with(sse_response(body.to_string()))
        .mount(&server)
        .await;

    let session = openrouter_session(&server);
    let (result, chunks) = send(&session, "hi").await;

    assert_ok!(result);
    assert_eq!(
        chunks,
        vec![
            StreamChunk::Content("Hello".to_string()),
            StreamChunk::Content(" world".to_string()),
            StreamChunk::Completed,
        ]
    );

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0]["model"], "test-model");
    assert_eq!(bodies[0]["stream"], true);
    assert_eq!(bodies[0]["input"][0]["role"], "system");
    assert_eq!(bodies[0]["input"][0]["content"], SYSTEM);
    assert_eq!(bodies[0]["input"][1]["role"], "user");
    assert_eq!(bodies[0]["input"][1]["content"], "hi");
}

#[tokio::test]
async fn test_openrouter_session_carries_history() {
    let server = MockServer::start().await;
    let reply = |text: &str| {
        format!(
            "data: {{\"type\":\"response.output_text.delta\",\"delta\":\"{text}\"}}\n\n\
             data: {{\"type\":\"response.completed\"}}\n\n"
        )
    };
    openrouter_mock()
        .respond_with(sse_response(reply("A")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    openrouter_mock()
        .respond_with(sse_response(reply("B")))
        .mount(&server)
        .await;

    let session = openrouter_session(&server);
    assert_ok!(send(&session, "q1").await.0);
    assert_ok!(send(&session, "q2").await.0);

    let bodies = request_bodies(&server).await;
    let input = bodies[1]["input"].as_array().unwrap();
    let roles: Vec<&str> = input.iter().map(|m| m["role"].as_str().unwrap()).collect();
    let texts: Vec<&str> = input.iter().map(|m| m["content"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    assert_eq!(texts, vec![SYSTEM, "q1", "A", "q2"]);
}

#[tokio::test]
async fn test_openrouter_http_error_is_api_error() {
    let server = MockServer::start().await;
    openrouter_mock()
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let session = openrouter_session(&server);
    let (result, chunks) = send(&session, "hi").await;

    match assert_err!(result) {
        ProviderError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(chunks.is_empty());
}

#[tokio::test]
async fn test_openrouter_response_failed_is_api_error() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        r#"{"type":"response.output_text.delta","delta":"par"}"#,
        r#"{"type":"response.failed","response":{"error":{"message":"model crashed"}}}"#,
    ]);
    openrouter_mock().respond_with(sse_response(body)).mount(&server).await;

    let session = openrouter_session(&server);
    let (result, chunks) = send(&session, "hi").await;

    match assert_err!(result) {
        ProviderError::Api { status, message } => {
            assert_eq!(status, 200);
            assert_eq!(message, "model crashed");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(chunks, vec![StreamChunk::Content("par".to_string())]);
}

#[tokio::test]
async fn test_openrouter_stream_without_completion_is_incomplete() {
    let server = MockServer::start().await;
    let body = sse_body(&[r#"{"type":"response.output_text.delta","delta":"cut"}"#]);
    openrouter_mock().respond_with(sse_response(body)).mount(&server).await;

    let session = openrouter_session(&server);
    let (result, chunks) = send(&session, "hi").await;

    assert!(matches!(assert_err!(result), ProviderError::Incomplete));
    assert_eq!(content_of(&chunks), "cut");
}
