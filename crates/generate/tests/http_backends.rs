//! Hosted backends against local HTTP fixtures, driven through the generator.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use futures::{stream, StreamExt};
use generate::{
    BackendConfig, GeminiBackend, GenerativeBackend, OllamaBackend, Pacing, StreamEvent,
    StreamingGenerator,
};
use serde_json::Value;

const API_KEY: &str = "fixture-key";

const GEMINI_EVENTS: &str = concat!(
    r#"data: {"candidates":[{"content":{"parts":[{"text":"Café is"}],"role":"model"}}]}"#,
    "\r\n\r\n",
    r#"data: {"candidates":[{"content":{"parts":[{"text":" open."}],"role":"model"},"finishReason":"STOP"}]}"#,
    "\r\n\r\n",
);

const OLLAMA_LINES: &str = concat!(
    r#"{"model":"llama3","response":"Try","done":false}"#,
    "\n",
    r#"{"model":"llama3","response":" rebooting.","done":false}"#,
    "\n",
    r#"{"model":"llama3","response":"","done":true}"#,
    "\n",
);

/// Body delivered in five-byte reads so lines and characters arrive split.
fn chunked(text: &'static str) -> Body {
    let pieces: Vec<Result<Vec<u8>, Infallible>> = text
        .as_bytes()
        .chunks(5)
        .map(|piece| Ok(piece.to_vec()))
        .collect();
    Body::from_stream(stream::iter(pieces))
}

async fn gemini_fixture(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Response {
    if method != Method::POST
        || uri.path() != "/v1beta/models/gemini-1.5-flash:streamGenerateContent"
        || uri.query() != Some("alt=sse")
    {
        return StatusCode::NOT_FOUND.into_response();
    }
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"code":401,"message":"API key not valid"}}"#,
        )
            .into_response();
    }
    let request: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let prompt = request
        .pointer("/contents/0/parts/0/text")
        .and_then(Value::as_str);
    if prompt != Some("User question:\nhi") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    (
        [(header::CONTENT_TYPE, "text/event-stream")],
        chunked(GEMINI_EVENTS),
    )
        .into_response()
}

async fn ollama_fixture(uri: Uri, body: String) -> Response {
    if uri.path() != "/api/generate" {
        return StatusCode::NOT_FOUND.into_response();
    }
    let request: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    if request["stream"] != Value::Bool(true) {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if request["model"] != "missing" {
        return (
            [(header::CONTENT_TYPE, "application/x-ndjson")],
            chunked(OLLAMA_LINES),
        )
            .into_response();
    }
    (
        StatusCode::NOT_FOUND,
        r#"{"error":"model 'missing' not found"}"#,
    )
        .into_response()
}

/// Serve `app` on an ephemeral local port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn run(backend: impl GenerativeBackend + 'static, prompt: &str) -> Vec<StreamEvent> {
    StreamingGenerator::new(Arc::new(backend))
        .with_pacing(Pacing::none())
        .stream(prompt)
        .collect()
        .await
}

fn gemini(base_url: String, api_key: &str) -> GeminiBackend {
    GeminiBackend::from_config(&BackendConfig {
        api_key: Some(api_key.into()),
        base_url: Some(format!("{base_url}/v1beta")),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn gemini_stream_reaches_events_word_by_word() {
    let base = serve(Router::new().fallback(gemini_fixture)).await;

    let events = run(gemini(base, API_KEY), "User question:\nhi").await;
    assert_eq!(
        events,
        vec![
            StreamEvent::start("gemini"),
            StreamEvent::chunk("Café"),
            StreamEvent::chunk(" is"),
            StreamEvent::chunk(" open."),
            StreamEvent::End,
        ]
    );
}

#[tokio::test]
async fn gemini_rejected_key_becomes_error_event() {
    let base = serve(Router::new().fallback(gemini_fixture)).await;

    let err = gemini(base.clone(), "wrong-key")
        .stream_complete("User question:\nhi")
        .await
        .err()
        .unwrap();
    let message = err.to_string();
    assert!(message.contains("gemini returned 401"), "{message}");
    assert!(message.contains("API key not valid"), "{message}");

    let events = run(gemini(base, "wrong-key"), "User question:\nhi").await;
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], StreamEvent::start("gemini"));
    assert!(matches!(
        &events[1],
        StreamEvent::Error { message } if message.contains("401")
    ));
    assert_eq!(events[2], StreamEvent::End);
}

#[tokio::test]
async fn ollama_stream_reaches_events_word_by_word() {
    let base = serve(Router::new().fallback(ollama_fixture)).await;
    let backend = OllamaBackend::from_config(&BackendConfig {
        provider: "ollama".into(),
        base_url: Some(base),
        ..Default::default()
    })
    .unwrap();

    let events = run(backend, "anything").await;
    assert_eq!(
        events,
        vec![
            StreamEvent::start("ollama"),
            StreamEvent::chunk("Try"),
            StreamEvent::chunk(" rebooting."),
            StreamEvent::End,
        ]
    );
}

#[tokio::test]
async fn ollama_unknown_model_becomes_error_event() {
    let base = serve(Router::new().fallback(ollama_fixture)).await;
    let backend = OllamaBackend::from_config(&BackendConfig {
        provider: "ollama".into(),
        base_url: Some(base),
        model: Some("missing".into()),
        ..Default::default()
    })
    .unwrap();

    let events = run(backend, "anything").await;
    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[1],
        StreamEvent::Error { message } if message.contains("ollama returned 404")
            && message.contains("model 'missing' not found")
    ));
    assert_eq!(events[2], StreamEvent::End);
}
