use std::fmt::Display;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};

use super::lines::lines;
use super::{rejected, BackendConfig, FragmentStream, GenerativeBackend, HTTP_CLIENT};
use crate::GenerateError;

/// Local Ollama server, `/api/generate` with newline-delimited JSON output.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";
    pub const DEFAULT_MODEL: &'static str = "llama3";

    pub fn from_config(cfg: &BackendConfig) -> Result<Self, GenerateError> {
        let base_url = cfg
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(Self::DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(GenerateError::InvalidConfig(format!(
                "ollama base url must be http(s): {base_url}"
            )));
        }
        let model = cfg
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(Self::DEFAULT_MODEL)
            .to_string();
        Ok(Self { base_url, model })
    }
}

#[async_trait]
impl GenerativeBackend for OllamaBackend {
    fn source(&self) -> &str {
        "ollama"
    }

    async fn stream_complete(&self, prompt: &str) -> Result<FragmentStream, GenerateError> {
        let body = json!({ "model": self.model, "prompt": prompt, "stream": true });
        let response = HTTP_CLIENT
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, base_url = %self.base_url, "ollama request failed");
                GenerateError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), model = %self.model, "ollama rejected request");
            return Err(rejected("ollama", status, &text));
        }

        Ok(ndjson_fragments(response.bytes_stream()))
    }
}

/// Text fragments carried by an NDJSON response body, in arrival order.
fn ndjson_fragments<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    lines(body)
        .filter_map(|line| async move {
            match line {
                Ok(line) => parse_ndjson_line(&line),
                Err(e) => Some(Err(e)),
            }
        })
        .boxed()
}

fn parse_ndjson_line(line: &str) -> Option<Result<String, GenerateError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return Some(Err(GenerateError::Malformed(e.to_string()))),
    };
    match value.get("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(message)) => {
            return Some(Err(GenerateError::Unavailable(message.clone())));
        }
        Some(other) => {
            let message = other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string());
            return Some(Err(GenerateError::Unavailable(message)));
        }
    }
    value
        .get("response")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(|text| Ok(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_response_field() {
        assert_eq!(
            parse_ndjson_line(r#"{"model":"llama3","response":" Hello","done":false}"#),
            Some(Ok(" Hello".to_string()))
        );
        assert_eq!(
            parse_ndjson_line(r#"{"model":"llama3","response":"","done":true}"#),
            None
        );
        assert_eq!(parse_ndjson_line("   "), None);
    }

    #[test]
    fn surfaces_errors() {
        assert_eq!(
            parse_ndjson_line(r#"{"error":"model 'x' not found"}"#),
            Some(Err(GenerateError::Unavailable("model 'x' not found".into())))
        );
        assert!(matches!(
            parse_ndjson_line("{oops"),
            Some(Err(GenerateError::Malformed(_)))
        ));
    }

    #[test]
    fn structured_errors_are_not_empty_completions() {
        assert_eq!(
            parse_ndjson_line(r#"{"error":{"message":"out of memory","code":500}}"#),
            Some(Err(GenerateError::Unavailable("out of memory".into())))
        );
        assert_eq!(
            parse_ndjson_line(r#"{"error":{"code":500}}"#),
            Some(Err(GenerateError::Unavailable(r#"{"code":500}"#.into())))
        );
        assert_eq!(
            parse_ndjson_line(r#"{"error":null,"response":"ok"}"#),
            Some(Ok("ok".to_string()))
        );
    }

    #[tokio::test]
    async fn body_split_across_reads() {
        let body = concat!(
            r#"{"response":"Größe","done":false}"#,
            "\n",
            r#"{"response":" aus","done":false}"#,
            "\n",
            r#"{"response":"","done":true}"#,
            "\n",
        );
        // Seven-byte reads cut through lines and through multi-byte characters.
        let parts: Vec<Result<Vec<u8>, &str>> = body
            .as_bytes()
            .chunks(7)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();

        let fragments: Vec<_> = ndjson_fragments(futures::stream::iter(parts))
            .collect()
            .await;
        assert_eq!(
            fragments,
            vec![Ok("Größe".to_string()), Ok(" aus".to_string())]
        );
    }

    #[test]
    fn defaults_and_validation() {
        let backend = OllamaBackend::from_config(&BackendConfig::default()).unwrap();
        assert_eq!(backend.base_url, "http://localhost:11434");
        assert_eq!(backend.model, "llama3");

        let bad = BackendConfig {
            base_url: Some("localhost:11434".into()),
            ..Default::default()
        };
        assert!(OllamaBackend::from_config(&bad).is_err());
    }
}
