//! Exact nearest-neighbour search over a small, immutable set of unit vectors.
//!
//! The knowledge base this serves holds tens to a few thousand entries, so a
//! linear inner-product scan is both fast enough and exact. Exactness matters
//! here: the tie-break rule (lowest index wins) is part of the contract and an
//! approximate graph search could not honour it.

use semantic::{dot, Embedding};

use crate::{IndexBuildError, IndexError};

/// Best match for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// Position of the matching vector (and of its knowledge-base entry).
    pub best_index: usize,
    /// Inner product with the query, clamped to `[-1, 1]`.
    pub score: f32,
}

/// Immutable, index-aligned collection of embeddings.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    dimension: Option<usize>,
    vectors: Vec<Embedding>,
}

impl VectorIndex {
    /// Build from embeddings in entry order. All vectors must share one dimension.
    pub fn from_embeddings(vectors: Vec<Embedding>) -> Result<Self, IndexBuildError> {
        let dimension = vectors.first().map(Embedding::dimension);
        if let Some(expected) = dimension {
            if expected == 0 {
                return Err(IndexBuildError::ZeroDimension);
            }
            if let Some((index, v)) = vectors
                .iter()
                .enumerate()
                .find(|(_, v)| v.dimension() != expected)
            {
                return Err(IndexBuildError::DimensionMismatch {
                    index,
                    expected,
                    got: v.dimension(),
                });
            }
        }
        Ok(Self { dimension, vectors })
    }

    /// Dimension shared by every stored vector; `None` when empty.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Arg-max of inner product against `query` (k = 1).
    ///
    /// Returns `Ok(None)` for an empty index. When several vectors reach the
    /// same maximum the lowest index wins. NaN scores never win.
    pub fn search(&self, query: &Embedding) -> Result<Option<SearchResult>, IndexError> {
        let Some(expected) = self.dimension else {
            return Ok(None);
        };
        if query.dimension() != expected {
            return Err(IndexError::DimensionMismatch {
                expected,
                got: query.dimension(),
            });
        }

        let q = query.as_slice();
        let mut best: Option<SearchResult> = None;
        for (idx, v) in self.vectors.iter().enumerate() {
            let score = dot(q, v.as_slice());
            if score.is_nan() {
                continue;
            }
            // Strict comparison keeps the first (lowest) index on ties.
            if best.map_or(true, |b| score > b.score) {
                best = Some(SearchResult {
                    best_index: idx,
                    score,
                });
            }
        }

        Ok(best.map(|b| SearchResult {
            score: b.score.clamp(-1.0, 1.0),
            ..b
        }))
    }
}
