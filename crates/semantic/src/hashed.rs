use async_trait::async_trait;
use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{Embedder, Embedding, SemanticError};

const BIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic, network-free embedder based on feature hashing.
///
/// Lowercased alphanumeric tokens and adjacent-token bigrams are hashed into
/// a fixed number of signed buckets, then the bucket vector is L2-normalized.
/// Questions sharing vocabulary land close together, which is enough for a
/// small curated knowledge base and keeps tests reproducible.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    model_name: String,
    dimension: usize,
}

impl HashedEmbedder {
    pub fn new(model_name: impl Into<String>, dimension: usize) -> Result<Self, SemanticError> {
        if dimension == 0 {
            return Err(SemanticError::InvalidConfig(
                "hashed embedder dimension must be non-zero".into(),
            ));
        }
        Ok(Self {
            model_name: model_name.into(),
            dimension,
        })
    }

    /// Synchronous core of [`Embedder::embed`].
    pub fn embed_now(&self, text: &str) -> Embedding {
        let tokens = tokenize(text);
        let mut v = vec![0f32; self.dimension];

        if tokens.is_empty() {
            // No word characters: hash the raw text so the result is still a unit vector.
            self.accumulate(&mut v, text, 1.0);
        } else {
            for token in &tokens {
                self.accumulate(&mut v, token, 1.0);
            }
            for pair in tokens.windows(2) {
                let bigram = format!("{} {}", pair[0], pair[1]);
                self.accumulate(&mut v, &bigram, BIGRAM_WEIGHT);
            }
        }

        l2_normalize_in_place(&mut v);
        Embedding::from_normalized(v)
    }

    fn accumulate(&self, v: &mut [f32], feature: &str, weight: f32) {
        let h = hash64(feature);
        let bucket = (h % self.dimension as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        v[bucket] += sign * weight;
    }
}

#[async_trait]
impl Embedder for HashedEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, text: &str) -> Result<Embedding, SemanticError> {
        Ok(self.embed_now(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, SemanticError> {
        Ok(texts.iter().map(|text| self.embed_now(text)).collect())
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
