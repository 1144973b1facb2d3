use super::*;
use std::collections::HashMap;

use async_trait::async_trait;
use index::{Entry, KnowledgeBase, KnowledgeIndex};
use semantic::{Embedding, HashedEmbedder, SemanticError};

/// Maps known texts to fixed vectors so scores are exact and predictable.
struct Fixed {
    vectors: HashMap<&'static str, Vec<f32>>,
}

impl Fixed {
    fn new(pairs: &[(&'static str, Vec<f32>)]) -> Self {
        Self {
            vectors: pairs.iter().cloned().collect(),
        }
    }
}

#[async_trait]
impl Embedder for Fixed {
    fn model_name(&self) -> &str {
        "fixed"
    }

    async fn embed(&self, text: &str) -> Result<Embedding, SemanticError> {
        self.vectors
            .get(text)
            .map(|v| Embedding::new(v.clone()))
            .ok_or_else(|| SemanticError::Unavailable(format!("no vector for {text:?}")))
    }
}

const RESET_Q: &str = "How do I reset my password?";
const RESET_A: &str = "Go to Settings > Security > Reset Password.";
const VPN_Q: &str = "How do I connect to VPN?";
const VPN_A: &str = "Open the VPN client and sign in.";

fn knowledge() -> KnowledgeBase {
    KnowledgeBase::from_entries(vec![Entry::new(RESET_Q, RESET_A), Entry::new(VPN_Q, VPN_A)])
        .unwrap()
}

fn fixed_embedder() -> Arc<Fixed> {
    let at = |cos: f32| vec![cos, (1.0 - cos * cos).sqrt(), 0.0];
    Arc::new(Fixed::new(&[
        (RESET_Q, vec![1.0, 0.0, 0.0]),
        (VPN_Q, vec![0.0, 0.0, 1.0]),
        ("I forgot my password, how can I reset it?", at(0.85)),
        ("What's the weather in Seoul?", at(0.12)),
        ("vpn and password", vec![1.0, 0.0, 1.0]),
    ]))
}

async fn router(threshold: f32) -> Router {
    let embedder = fixed_embedder();
    let index = KnowledgeIndex::build(knowledge(), embedder.as_ref())
        .await
        .unwrap();
    Router::new(
        Arc::new(index),
        embedder,
        MatchConfig::default().with_threshold(threshold),
    )
    .unwrap()
}

#[tokio::test]
async fn paraphrase_above_threshold_matches() {
    let router = router(0.7).await;
    let decision = router
        .decide("I forgot my password, how can I reset it?")
        .await
        .unwrap();
    match decision {
        RouterDecision::Matched { answer, score } => {
            assert_eq!(answer, RESET_A);
            assert!((score - 0.85).abs() < 1e-4, "score {score}");
        }
        other => panic!("expected match, got {other:?}"),
    }
}

#[tokio::test]
async fn unrelated_question_falls_back_with_near_miss() {
    let router = router(0.7).await;
    let decision = router.decide("What's the weather in Seoul?").await.unwrap();
    match decision {
        RouterDecision::Fallback { near_miss_score } => {
            assert!((near_miss_score - 0.12).abs() < 1e-4, "score {near_miss_score}");
        }
        other => panic!("expected fallback, got {other:?}"),
    }
}

#[tokio::test]
async fn exact_question_scores_one() {
    let router = router(0.7).await;
    let decision = router.decide(VPN_Q).await.unwrap();
    assert_eq!(
        decision,
        RouterDecision::Matched {
            answer: VPN_A.to_string(),
            score: 1.0
        }
    );
}

#[tokio::test]
async fn threshold_is_inclusive() {
    let question = "I forgot my password, how can I reset it?";
    let probe = router(-1.0).await.decide(question).await.unwrap();
    let score = probe.score();

    let at_threshold = router(score).await.decide(question).await.unwrap();
    assert!(at_threshold.is_match(), "score equal to threshold must match");

    let above = router(score + 1e-4).await.decide(question).await.unwrap();
    assert_eq!(
        above,
        RouterDecision::Fallback {
            near_miss_score: score
        }
    );
}

#[tokio::test]
async fn tie_resolves_to_first_entry() {
    let router = router(0.5).await;
    match router.decide("vpn and password").await.unwrap() {
        RouterDecision::Matched { answer, .. } => assert_eq!(answer, RESET_A),
        other => panic!("expected match, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_question_is_sentinel_fallback() {
    let router = router(0.7).await;
    for question in ["", "   ", "\n\t"] {
        assert_eq!(
            router.decide(question).await.unwrap(),
            RouterDecision::Fallback {
                near_miss_score: NO_MATCH_SCORE
            }
        );
    }
}

#[tokio::test]
async fn empty_index_always_falls_back() {
    let index = KnowledgeIndex::from_parts(KnowledgeBase::default(), Vec::new()).unwrap();
    let router = Router::new(
        Arc::new(index),
        fixed_embedder(),
        MatchConfig::default(),
    )
    .unwrap();
    assert_eq!(
        router.decide(RESET_Q).await.unwrap(),
        RouterDecision::Fallback {
            near_miss_score: NO_MATCH_SCORE
        }
    );
}

#[tokio::test]
async fn embedder_failure_is_reported() {
    let router = router(0.7).await;
    let err = router.decide("something nobody mapped").await.unwrap_err();
    assert!(matches!(err, MatchError::Embedding(SemanticError::Unavailable(_))));
}

#[tokio::test]
async fn query_dimension_mismatch_is_reported() {
    let index = KnowledgeIndex::build(knowledge(), fixed_embedder().as_ref())
        .await
        .unwrap();
    let other = Arc::new(HashedEmbedder::new("h", 16).unwrap());
    let router = Router::new(Arc::new(index), other, MatchConfig::default()).unwrap();
    let err = router.decide(RESET_Q).await.unwrap_err();
    assert!(matches!(err, MatchError::Index(_)));
}

#[tokio::test]
async fn decisions_are_deterministic() {
    let embedder = Arc::new(HashedEmbedder::new("h", 128).unwrap());
    let index = KnowledgeIndex::build(knowledge(), embedder.as_ref())
        .await
        .unwrap();
    let router = Router::new(Arc::new(index), embedder, MatchConfig::default()).unwrap();

    let first = router.decide("reset password please").await.unwrap();
    for _ in 0..5 {
        assert_eq!(router.decide("reset password please").await.unwrap(), first);
    }
}

#[test]
fn invalid_threshold_is_rejected() {
    let err = Router::new(
        Arc::new(KnowledgeIndex::default()),
        fixed_embedder(),
        MatchConfig::default().with_threshold(2.0),
    )
    .err()
    .unwrap();
    assert!(matches!(err, MatchError::InvalidConfig(_)));
}
