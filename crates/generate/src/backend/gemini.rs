use std::fmt;
use std::fmt::Display;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};

use super::lines::lines;
use super::{rejected, BackendConfig, FragmentStream, GenerativeBackend, HTTP_CLIENT};
use crate::GenerateError;

/// Google Generative Language API, streamed as server-sent events.
#[derive(Clone)]
pub struct GeminiBackend {
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-flash";

    pub fn new(api_key: impl Into<String>) -> Result<Self, GenerateError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerateError::InvalidConfig(
                "gemini backend requires an api key".into(),
            ));
        }
        Ok(Self {
            base_url: Self::DEFAULT_BASE_URL.into(),
            model: Self::DEFAULT_MODEL.into(),
            api_key,
        })
    }

    pub fn from_config(cfg: &BackendConfig) -> Result<Self, GenerateError> {
        let mut backend = Self::new(cfg.api_key.clone().unwrap_or_default())?;
        if let Some(model) = cfg.model.as_deref().filter(|m| !m.trim().is_empty()) {
            backend.model = model.to_string();
        }
        if let Some(url) = cfg.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            backend.base_url = url.trim_end_matches('/').to_string();
        }
        Ok(backend)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }
}

impl fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn source(&self) -> &str {
        "gemini"
    }

    async fn stream_complete(&self, prompt: &str) -> Result<FragmentStream, GenerateError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });
        let response = HTTP_CLIENT
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, model = %self.model, "gemini request failed");
                GenerateError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), model = %self.model, "gemini rejected request");
            return Err(rejected("gemini", status, &text));
        }

        tracing::debug!(model = %self.model, "gemini stream opened");
        Ok(sse_fragments(response.bytes_stream()))
    }
}

/// Text fragments carried by an SSE response body, in arrival order.
fn sse_fragments<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    lines(body)
        .filter_map(|line| async move {
            match line {
                Ok(line) => parse_sse_line(&line),
                Err(e) => Some(Err(e)),
            }
        })
        .boxed()
}

/// Text carried by one SSE line, if any.
///
/// Only `data:` lines matter. Each holds a `GenerateContentResponse` whose
/// first candidate's parts are concatenated into one fragment.
fn parse_sse_line(line: &str) -> Option<Result<String, GenerateError>> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    let value: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return Some(Err(GenerateError::Malformed(e.to_string()))),
    };
    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Some(Err(GenerateError::Unavailable(message.to_string())));
    }

    let text: String = value
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    if text.is_empty() {
        None
    } else {
        Some(Ok(text))
    }
}
