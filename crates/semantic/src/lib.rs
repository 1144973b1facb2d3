//! faqroute semantic layer
//!
//! Turns question text into L2-normalized dense vectors that the knowledge
//! base index can compare by inner product.
//!
//! Two embedders ship with the crate:
//!
//! - **Hashed** - local feature hashing over word unigrams and bigrams. No
//!   model files, no network, fully deterministic. The default.
//! - **API** - calls an HTTP embedding endpoint (OpenAI-compatible, Hugging
//!   Face feature-extraction, or a plain custom shape) with retry on
//!   transient failures.
//!
//! Both sit behind the [`Embedder`] trait, so the router never cares which
//! one it got. Tests usually plug in their own implementation with fixed
//! vectors.
//!
//! ## Quick example
//!
//! ```no_run
//! use semantic::{build_embedder, SemanticConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let embedder = build_embedder(&SemanticConfig::default()).unwrap();
//!     let embedding = embedder.embed("How do I reset my password?").await.unwrap();
//!     assert!(embedding.is_normalized());
//! }
//! ```

pub mod config;
pub mod error;
pub mod retry;

mod api;
mod embedding;
mod hashed;
mod normalize;
mod serde_millis;

use std::sync::Arc;

use async_trait::async_trait;

pub use crate::api::ApiEmbedder;
pub use crate::config::SemanticConfig;
pub use crate::embedding::{dot, Embedding, UNIT_NORM_TOLERANCE};
pub use crate::error::SemanticError;
pub use crate::hashed::HashedEmbedder;
pub use crate::retry::RetryConfig;

/// Text → normalized vector.
///
/// Implementations must be deterministic for a fixed model: the same text
/// always yields the same vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Label of the model producing the vectors.
    fn model_name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Embedding, SemanticError>;

    /// Embed many texts, preserving order. Defaults to one call per text.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, SemanticError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Build the embedder selected by `cfg.mode`.
pub fn build_embedder(cfg: &SemanticConfig) -> Result<Arc<dyn Embedder>, SemanticError> {
    match cfg.mode.as_str() {
        "hashed" | "fast" => Ok(Arc::new(HashedEmbedder::new(
            cfg.model_name.clone(),
            cfg.dimension,
        )?)),
        "api" => Ok(Arc::new(ApiEmbedder::from_config(cfg)?)),
        other => Err(SemanticError::InvalidConfig(format!(
            "unknown embedder mode `{other}` (expected `hashed` or `api`)"
        ))),
    }
}
