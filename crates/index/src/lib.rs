//! # faqroute index
//!
//! Holds the curated knowledge base and the exact vector index built over its
//! questions.
//!
//! ## Core Types
//!
//! - [`Entry`] / [`KnowledgeBase`]: ordered `(question, answer)` pairs, loaded
//!   once from a JSON array.
//! - [`VectorIndex`]: one unit-length embedding per entry, searched by inner
//!   product with k = 1 and a lowest-index tie-break.
//! - [`KnowledgeIndex`]: the two above glued together so an index position
//!   always resolves to the right answer.
//!
//! Everything here is built once at startup and never mutated, so a shared
//! `Arc<KnowledgeIndex>` can serve any number of concurrent readers without
//! locking.
//!
//! ## Example
//!
//! ```no_run
//! use index::{KnowledgeBase, KnowledgeIndex};
//! use semantic::HashedEmbedder;
//!
//! # async fn demo() -> Result<(), index::IndexBuildError> {
//! let kb = KnowledgeBase::load("knowledge_base.json")?;
//! let embedder = HashedEmbedder::new("hashed-bow-v1", 384).expect("dimension");
//! let index = KnowledgeIndex::build(kb, &embedder).await?;
//! println!("indexed {} questions", index.len());
//! # Ok(())
//! # }
//! ```

mod knowledge;
pub mod vector;

use semantic::{Embedder, Embedding, SemanticError};
use thiserror::Error;

pub use crate::knowledge::{Entry, KnowledgeBase};
pub use crate::vector::{SearchResult, VectorIndex};

/// Fatal failures while building the index at startup.
#[derive(Debug, Error)]
pub enum IndexBuildError {
    #[error("failed to read knowledge base {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed knowledge base: {0}")]
    Malformed(String),
    #[error("knowledge base is empty")]
    Empty,
    #[error("knowledge base entry {index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: String },
    #[error("embedder unavailable while indexing: {0}")]
    Embedding(#[from] SemanticError),
    #[error("embedder returned {got} vectors for {expected} questions")]
    CountMismatch { expected: usize, got: usize },
    #[error("vector {index} has dimension {got}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },
    #[error("vector {index} is not unit length")]
    NotNormalized { index: usize },
    #[error("embeddings must have a non-zero dimension")]
    ZeroDimension,
}

/// Per-query index failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("query has dimension {got}, index expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Knowledge base plus its index-aligned vectors.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeIndex {
    knowledge: KnowledgeBase,
    vectors: VectorIndex,
}

impl KnowledgeIndex {
    /// Embed every question with `embedder` and index the results in entry order.
    pub async fn build(
        knowledge: KnowledgeBase,
        embedder: &dyn Embedder,
    ) -> Result<Self, IndexBuildError> {
        let questions: Vec<&str> = knowledge.questions().collect();
        let embeddings = embedder.embed_batch(&questions).await?;
        if embeddings.len() != questions.len() {
            return Err(IndexBuildError::CountMismatch {
                expected: questions.len(),
                got: embeddings.len(),
            });
        }

        let index = Self::from_parts(knowledge, embeddings)?;
        tracing::info!(
            entries = index.len(),
            dimension = index.dimension().unwrap_or(0),
            model = embedder.model_name(),
            "knowledge index built"
        );
        Ok(index)
    }

    /// Pair pre-computed embeddings with entries. Vectors must be unit length
    /// and as many as the entries. An empty pair is allowed and yields an index
    /// that never matches.
    pub fn from_parts(
        knowledge: KnowledgeBase,
        embeddings: Vec<Embedding>,
    ) -> Result<Self, IndexBuildError> {
        if embeddings.len() != knowledge.len() {
            return Err(IndexBuildError::CountMismatch {
                expected: knowledge.len(),
                got: embeddings.len(),
            });
        }
        if let Some(index) = embeddings.iter().position(|e| !e.is_normalized()) {
            return Err(IndexBuildError::NotNormalized { index });
        }
        let vectors = VectorIndex::from_embeddings(embeddings)?;
        Ok(Self { knowledge, vectors })
    }

    /// Nearest entry to `query`; `None` when the index is empty.
    pub fn search(&self, query: &Embedding) -> Result<Option<SearchResult>, IndexError> {
        self.vectors.search(query)
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.knowledge.get(index)
    }

    pub fn dimension(&self) -> Option<usize> {
        self.vectors.dimension()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semantic::HashedEmbedder;

    struct Down;

    #[async_trait]
    impl Embedder for Down {
        fn model_name(&self) -> &str {
            "down"
        }

        async fn embed(&self, _text: &str) -> Result<Embedding, SemanticError> {
            Err(SemanticError::Unavailable("connection refused".into()))
        }
    }

    struct Short;

    #[async_trait]
    impl Embedder for Short {
        fn model_name(&self) -> &str {
            "short"
        }

        async fn embed(&self, _text: &str) -> Result<Embedding, SemanticError> {
            Ok(Embedding::new(vec![1.0]))
        }

        async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, SemanticError> {
            Ok(vec![Embedding::new(vec![1.0])])
        }
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::from_entries(vec![
            Entry::new(
                "How do I reset my password?",
                "Go to Settings > Security > Reset Password.",
            ),
            Entry::new("How do I connect to VPN?", "Open the VPN client and sign in."),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn build_aligns_entries_with_vectors() {
        let embedder = HashedEmbedder::new("h", 64).unwrap();
        let index = KnowledgeIndex::build(kb(), &embedder).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), Some(64));

        let query = embedder.embed_now("how do i connect to vpn");
        let hit = index.search(&query).unwrap().unwrap();
        assert_eq!(hit.best_index, 1);
        assert_eq!(
            index.entry(hit.best_index).unwrap().answer,
            "Open the VPN client and sign in."
        );
    }

    #[tokio::test]
    async fn embedder_failure_is_fatal() {
        let err = KnowledgeIndex::build(kb(), &Down).await.unwrap_err();
        assert!(matches!(err, IndexBuildError::Embedding(_)));
    }

    #[tokio::test]
    async fn short_batch_is_rejected() {
        let err = KnowledgeIndex::build(kb(), &Short).await.unwrap_err();
        assert!(matches!(
            err,
            IndexBuildError::CountMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn from_parts_rejects_unnormalized() {
        let err = KnowledgeIndex::from_parts(
            kb(),
            vec![
                Embedding::new(vec![1.0, 0.0]),
                Embedding::from_normalized(vec![2.0, 0.0]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, IndexBuildError::NotNormalized { index: 1 }));
    }

    #[test]
    fn empty_parts_never_match() {
        let index = KnowledgeIndex::from_parts(KnowledgeBase::default(), Vec::new()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.search(&Embedding::new(vec![1.0])).unwrap(), None);
    }
}
