use index::IndexError;
use semantic::SemanticError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Score reported for questions that could not be compared at all: blank
/// input, or an empty knowledge base. It is the lowest possible cosine, so
/// it never satisfies a valid threshold.
pub const NO_MATCH_SCORE: f32 = -1.0;

/// Router tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum similarity (inclusive) for a direct knowledge-base answer.
    pub threshold: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

impl MatchConfig {
    pub const DEFAULT_THRESHOLD: f32 = 0.7;

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// The threshold must be a finite cosine value.
    pub fn validate(&self) -> Result<(), MatchError> {
        if !self.threshold.is_finite() || !(-1.0..=1.0).contains(&self.threshold) {
            return Err(MatchError::InvalidConfig(format!(
                "threshold must be within [-1, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Outcome of routing one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouterDecision {
    /// A knowledge-base entry was similar enough; answer it directly.
    Matched { answer: String, score: f32 },
    /// Nothing cleared the threshold; `near_miss_score` is the best similarity seen.
    Fallback { near_miss_score: f32 },
}

impl RouterDecision {
    pub fn is_match(&self) -> bool {
        matches!(self, RouterDecision::Matched { .. })
    }

    /// Similarity carried by either variant.
    pub fn score(&self) -> f32 {
        match self {
            RouterDecision::Matched { score, .. } => *score,
            RouterDecision::Fallback { near_miss_score } => *near_miss_score,
        }
    }
}

/// Request-level routing failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] SemanticError),
    #[error("index search failed: {0}")]
    Index(#[from] IndexError),
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold() {
        assert_eq!(MatchConfig::default().threshold, 0.7);
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn threshold_bounds() {
        assert!(MatchConfig::default().with_threshold(1.0).validate().is_ok());
        assert!(MatchConfig::default().with_threshold(-1.0).validate().is_ok());
        assert!(MatchConfig::default().with_threshold(1.5).validate().is_err());
        assert!(MatchConfig::default()
            .with_threshold(f32::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn decision_serializes_tagged() {
        let matched = RouterDecision::Matched {
            answer: "a".into(),
            score: 0.5,
        };
        let json = serde_json::to_value(&matched).unwrap();
        assert_eq!(json["decision"], "matched");
        assert_eq!(json["answer"], "a");

        let fallback = RouterDecision::Fallback {
            near_miss_score: 0.25,
        };
        let json = serde_json::to_value(&fallback).unwrap();
        assert_eq!(json["decision"], "fallback");
        assert_eq!(json["near_miss_score"], 0.25);
    }

    #[test]
    fn score_accessor() {
        assert_eq!(
            RouterDecision::Fallback {
                near_miss_score: NO_MATCH_SCORE
            }
            .score(),
            -1.0
        );
        assert!(RouterDecision::Matched {
            answer: String::new(),
            score: 0.9
        }
        .is_match());
    }
}
