use std::sync::Arc;
use std::time::Instant;

use index::KnowledgeIndex;
use semantic::Embedder;

use crate::types::{MatchConfig, MatchError, RouterDecision, NO_MATCH_SCORE};

#[cfg(test)]
mod tests;

/// Decides, per question, between a direct knowledge-base answer and fallback.
///
/// Holds only shared, read-only handles, so one `Router` can serve every
/// request concurrently.
#[derive(Clone)]
pub struct Router {
    index: Arc<KnowledgeIndex>,
    embedder: Arc<dyn Embedder>,
    config: MatchConfig,
}

impl Router {
    pub fn new(
        index: Arc<KnowledgeIndex>,
        embedder: Arc<dyn Embedder>,
        config: MatchConfig,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            index,
            embedder,
            config,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn index(&self) -> &KnowledgeIndex {
        &self.index
    }

    /// Route `question`.
    ///
    /// Blank input and an empty index both yield `Fallback` with
    /// [`NO_MATCH_SCORE`] instead of an error. Embedding and dimension failures
    /// are returned to the caller.
    pub async fn decide(&self, question: &str) -> Result<RouterDecision, MatchError> {
        let question = question.trim();
        if question.is_empty() {
            tracing::debug!("blank question routed to fallback");
            return Ok(RouterDecision::Fallback {
                near_miss_score: NO_MATCH_SCORE,
            });
        }
        if self.index.is_empty() {
            return Ok(RouterDecision::Fallback {
                near_miss_score: NO_MATCH_SCORE,
            });
        }

        let start = Instant::now();
        let query = self.embedder.embed(question).await?;
        let Some(hit) = self.index.search(&query)? else {
            return Ok(RouterDecision::Fallback {
                near_miss_score: NO_MATCH_SCORE,
            });
        };

        let decision = match self.index.entry(hit.best_index) {
            Some(entry) if hit.score >= self.config.threshold => RouterDecision::Matched {
                answer: entry.answer.clone(),
                score: hit.score,
            },
            _ => RouterDecision::Fallback {
                near_miss_score: hit.score,
            },
        };

        tracing::debug!(
            best_index = hit.best_index,
            score = hit.score,
            threshold = self.config.threshold,
            matched = decision.is_match(),
            latency_us = start.elapsed().as_micros() as u64,
            "question routed"
        );

        Ok(decision)
    }
}
