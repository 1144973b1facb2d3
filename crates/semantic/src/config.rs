use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;

/// Runtime configuration selecting and tuning the embedder.
///
/// # Example
/// ```no_run
/// use semantic::{build_embedder, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     mode: "api".into(),
///     api_url: Some("https://api.openai.com/v1/embeddings".into()),
///     api_auth_header: Some("Bearer sk-xxx".into()),
///     api_provider: Some("openai".into()),
///     model_name: "text-embedding-3-small".into(),
///     ..Default::default()
/// };
///
/// let _embedder = build_embedder(&cfg).expect("valid config");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// Embedder selector: `"hashed"` (local, deterministic) or `"api"` (remote HTTP).
    ///
    /// `hashed` only sees shared words, so reworded questions often miss the
    /// default threshold. Point `api` at a sentence-transformer model (for
    /// example a multilingual MiniLM behind a feature-extraction endpoint)
    /// to match paraphrases.
    pub mode: String,
    /// Label reported by the embedder; sent as `model` to OpenAI-style endpoints.
    pub model_name: String,
    /// Output dimension of the hashed embedder. Ignored in API mode.
    pub dimension: usize,
    /// Embedding endpoint when [`mode`](Self::mode) is `"api"`.
    pub api_url: Option<String>,
    /// Authorization header value (e.g. `"Bearer hf_xxx"`).
    pub api_auth_header: Option<String>,
    /// Remote payload dialect: `"openai"`, `"hf"`, or `"custom"` (default).
    pub api_provider: Option<String>,
    /// Per-request API timeout in seconds.
    pub api_timeout_secs: u64,
    /// Retry policy for API calls. `None` uses [`RetryConfig::default`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: "hashed".into(),
            model_name: "hashed-bow-v1".into(),
            dimension: 384,
            api_url: None,
            api_auth_header: None,
            api_provider: None,
            api_timeout_secs: 30,
            retry_config: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = SemanticConfig::default();
        assert_eq!(cfg.mode, "hashed");
        assert_eq!(cfg.dimension, 384);
        assert_eq!(cfg.api_timeout_secs, 30);
        assert!(cfg.api_url.is_none());
        assert!(cfg.retry_config.is_none());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SemanticConfig = serde_json::from_str(r#"{"mode":"api","api_url":"http://x"}"#)
            .expect("partial config should deserialize");
        assert_eq!(cfg.mode, "api");
        assert_eq!(cfg.api_url.as_deref(), Some("http://x"));
        assert_eq!(cfg.dimension, 384);
        assert_eq!(cfg.model_name, "hashed-bow-v1");
    }
}
