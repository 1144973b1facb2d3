//! Workspace umbrella crate for faqroute.
//!
//! faqroute answers free-text questions from a curated knowledge base when a
//! stored question is close enough, and otherwise streams a generated answer
//! word by word. This crate stitches the pipeline crates together behind one
//! [`Assistant`] context:
//!
//! - `semantic` embeds text into unit vectors.
//! - `index` loads the knowledge base and searches it exactly.
//! - `matcher` applies the similarity threshold.
//! - `generate` drives the fallback backend and emits the event protocol.

mod assistant;
pub mod config;
mod prompt;

use thiserror::Error;

pub use crate::assistant::{Answer, Assistant, EventStream};
pub use crate::config::{AssistantConfig, GenerationConfig};
pub use crate::prompt::{build_prompt, ChatMessage};

pub use generate::{
    build_backend, split_words, BackendConfig, FragmentStream, GenerateError, GenerativeBackend,
    Pacing, ScriptedBackend, StreamEvent, StreamFormat, StreamingGenerator,
};
pub use index::{Entry, IndexBuildError, IndexError, KnowledgeBase, KnowledgeIndex, SearchResult};
pub use matcher::{MatchConfig, MatchError, Router, RouterDecision, NO_MATCH_SCORE};
pub use semantic::{build_embedder, Embedder, Embedding, HashedEmbedder, SemanticConfig, SemanticError};

/// Failures while assembling an [`Assistant`]. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Index(#[from] IndexBuildError),
    #[error("embedder setup failed: {0}")]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error("backend setup failed: {0}")]
    Generate(#[from] GenerateError),
}
