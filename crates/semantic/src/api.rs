use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::time::Duration;

use crate::retry::{execute_with_retry_async, RetryConfig};
use crate::{Embedder, Embedding, SemanticConfig, SemanticError};

// Shared HTTP client with connection pooling; per-request timeouts come from config.
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(16)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiProviderKind {
    HuggingFace,
    OpenAI,
    Custom,
}

impl ApiProviderKind {
    fn from_config(cfg: &SemanticConfig) -> Self {
        let provider = cfg
            .api_provider
            .as_deref()
            .unwrap_or("custom")
            .to_ascii_lowercase();
        match provider.as_str() {
            "hf" | "huggingface" => ApiProviderKind::HuggingFace,
            "openai" | "gpt" => ApiProviderKind::OpenAI,
            _ => ApiProviderKind::Custom,
        }
    }
}

/// Embedder backed by a remote HTTP endpoint.
///
/// Three payload dialects are understood: OpenAI-compatible `/embeddings`,
/// Hugging Face feature-extraction, and a plain `{"texts": [...]}` custom
/// shape. Every returned vector is L2-normalized before it leaves here.
#[derive(Debug, Clone)]
pub struct ApiEmbedder {
    url: String,
    auth_header: Option<String>,
    provider: ApiProviderKind,
    model_name: String,
    timeout: Duration,
    retry: RetryConfig,
}

impl ApiEmbedder {
    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        let url = cfg
            .api_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| SemanticError::InvalidConfig("api_url is required for api mode".into()))?;

        Ok(Self {
            url,
            auth_header: cfg.api_auth_header.clone(),
            provider: ApiProviderKind::from_config(cfg),
            model_name: cfg.model_name.clone(),
            timeout: Duration::from_secs(cfg.api_timeout_secs.max(1)),
            retry: cfg.retry_config.unwrap_or_default(),
        })
    }

    fn build_payload(&self, texts: &[&str]) -> Value {
        match self.provider {
            ApiProviderKind::HuggingFace => json!({ "inputs": texts }),
            ApiProviderKind::OpenAI => json!({ "input": texts, "model": self.model_name }),
            ApiProviderKind::Custom => json!({ "texts": texts }),
        }
    }

    async fn send(&self, payload: &Value) -> Result<Value, SemanticError> {
        let mut request = HTTP_CLIENT
            .post(&self.url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json");
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request
            .json(payload)
            .send()
            .await
            .map_err(|e| SemanticError::Unavailable(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SemanticError::Unavailable(format!(
                "HTTP error {status}: {body}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SemanticError::MalformedResponse(format!("invalid JSON response: {e}")))
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, text: &str) -> Result<Embedding, SemanticError> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors.pop().ok_or(SemanticError::CountMismatch {
            expected: 1,
            actual: 0,
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, SemanticError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = self.build_payload(texts);
        let outcome = execute_with_retry_async(
            &self.retry,
            |_| self.send(&payload),
            SemanticError::is_retryable,
        )
        .await;

        tracing::debug!(
            url = %self.url,
            inputs = texts.len(),
            attempts = outcome.attempts,
            elapsed_ms = outcome.total_duration.as_millis() as u64,
            "embedding request finished"
        );

        let vectors = parse_embeddings_from_value(outcome.into_result()?)?;
        if vectors.len() != texts.len() {
            return Err(SemanticError::CountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }

        Ok(vectors.into_iter().map(Embedding::new).collect())
    }
}

/// Accepts `{"data": [{"embedding": [...]}, ...]}`, `{"embeddings": [[...]]}`,
/// a bare `[[...], ...]`, or a single bare `[...]`.
fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => obj
                            .remove("embedding")
                            .ok_or_else(|| {
                                SemanticError::MalformedResponse(
                                    "missing `embedding` field in data item".into(),
                                )
                            })
                            .and_then(parse_embedding_vector),
                        _ => Err(SemanticError::MalformedResponse(
                            "unexpected entry inside `data` array".into(),
                        )),
                    })
                    .collect();
            }

            Err(SemanticError::MalformedResponse(
                "unsupported API response shape".into(),
            ))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(Vec::new()),
        Value::Array(items) if items.iter().all(Value::is_array) => {
            items.into_iter().map(parse_embedding_vector).collect()
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, SemanticError> {
    let Value::Array(items) = value else {
        return Err(SemanticError::MalformedResponse(
            "embedding is not an array".into(),
        ));
    };
    if items.is_empty() {
        return Err(SemanticError::MalformedResponse("embedding is empty".into()));
    }
    items
        .into_iter()
        .map(|item| {
            item.as_f64().map(|f| f as f32).ok_or_else(|| {
                SemanticError::MalformedResponse("embedding contains a non-number".into())
            })
        })
        .collect()
}
