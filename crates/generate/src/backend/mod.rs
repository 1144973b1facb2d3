//! Generative backends producing lazy fragment streams.

mod gemini;
mod lines;
mod ollama;
mod scripted;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::GenerateError;

pub use self::gemini::GeminiBackend;
pub use self::ollama::OllamaBackend;
pub use self::scripted::ScriptedBackend;

/// Finite, fallible, non-restartable sequence of generated text fragments.
/// Dropping it releases the underlying connection.
pub type FragmentStream = BoxStream<'static, Result<String, GenerateError>>;

/// A text-generation service that answers a prompt incrementally.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Identifier reported in the `Start` event.
    fn source(&self) -> &str;

    /// Begin generating for `prompt`. Fragments are pulled lazily.
    async fn stream_complete(&self, prompt: &str) -> Result<FragmentStream, GenerateError>;
}

// Streaming responses can run long, so only connecting is bounded here; the
// generator enforces the overall deadline.
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(8)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Error for a non-success HTTP status, quoting the start of the body.
fn rejected(provider: &str, status: reqwest::StatusCode, body: &str) -> GenerateError {
    GenerateError::Unavailable(format!(
        "{provider} returned {status}: {}",
        body.chars().take(200).collect::<String>()
    ))
}

/// Backend selection and settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// `"gemini"`, `"ollama"` or `"scripted"`.
    pub provider: String,
    /// Model name; each provider has its own default.
    pub model: Option<String>,
    /// Override for the provider's base URL.
    pub base_url: Option<String>,
    /// Credential for hosted providers.
    pub api_key: Option<String>,
    /// Reply streamed by the scripted provider.
    pub scripted_reply: String,
    /// Source id reported by the scripted provider.
    pub scripted_source: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".into(),
            model: None,
            base_url: None,
            api_key: None,
            scripted_reply: "I'm not sure about this. Please contact the relevant department."
                .into(),
            scripted_source: "scripted".into(),
        }
    }
}

/// Build the backend named by `cfg.provider`.
pub fn build_backend(cfg: &BackendConfig) -> Result<Arc<dyn GenerativeBackend>, GenerateError> {
    match cfg.provider.to_ascii_lowercase().as_str() {
        "gemini" | "google" => Ok(Arc::new(GeminiBackend::from_config(cfg)?)),
        "ollama" => Ok(Arc::new(OllamaBackend::from_config(cfg)?)),
        "scripted" | "mock" => Ok(Arc::new(ScriptedBackend::new(
            cfg.scripted_source.clone(),
            [cfg.scripted_reply.clone()],
        ))),
        other => Err(GenerateError::InvalidConfig(format!(
            "unknown backend provider `{other}`"
        ))),
    }
}
