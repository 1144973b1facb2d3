use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use generate::{build_backend, GenerativeBackend, StreamEvent, StreamFormat, StreamingGenerator};
use index::{KnowledgeBase, KnowledgeIndex};
use matcher::{MatchError, Router, RouterDecision};
use semantic::{build_embedder, Embedder};

use crate::config::AssistantConfig;
use crate::prompt::{build_prompt, ChatMessage};
use crate::AssistantError;

/// Paced event stream for one fallback answer.
pub type EventStream = BoxStream<'static, StreamEvent>;

/// Reply to one question.
pub enum Answer {
    /// Curated answer from the knowledge base.
    Direct { response: String, score: f32 },
    /// Generated answer, delivered incrementally.
    Stream {
        near_miss_score: f32,
        events: EventStream,
    },
}

impl std::fmt::Debug for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Answer::Direct { response, score } => f
                .debug_struct("Direct")
                .field("response", response)
                .field("score", score)
                .finish(),
            Answer::Stream {
                near_miss_score, ..
            } => f
                .debug_struct("Stream")
                .field("near_miss_score", near_miss_score)
                .finish_non_exhaustive(),
        }
    }
}

/// Immutable per-process context: the indexed knowledge base, the router and
/// the fallback generator. Built once at startup and shared behind an `Arc`.
#[derive(Clone)]
pub struct Assistant {
    router: Router,
    generator: StreamingGenerator,
    stream_format: StreamFormat,
}

impl Assistant {
    /// Load the knowledge base, embed it and wire up the configured backend.
    ///
    /// Any failure here is fatal: the service must not start without a
    /// complete index.
    pub async fn build(config: &AssistantConfig) -> Result<Self, AssistantError> {
        config.validate()?;
        let embedder = build_embedder(&config.semantic)?;
        let knowledge = KnowledgeBase::load(&config.knowledge_base)?;
        let index = KnowledgeIndex::build(knowledge, embedder.as_ref()).await?;
        let backend = build_backend(&config.backend)?;
        Self::from_parts(Arc::new(index), embedder, backend, config)
    }

    /// Assemble from already-built pieces.
    pub fn from_parts(
        index: Arc<KnowledgeIndex>,
        embedder: Arc<dyn Embedder>,
        backend: Arc<dyn GenerativeBackend>,
        config: &AssistantConfig,
    ) -> Result<Self, AssistantError> {
        config.validate()?;
        let router = Router::new(index, embedder, config.matcher)?;
        let generator = StreamingGenerator::new(backend)
            .with_pacing(config.generation.pacing())
            .with_deadline(config.generation.deadline());

        tracing::info!(
            entries = router.index().len(),
            threshold = config.matcher.threshold,
            backend = generator.source(),
            "assistant ready"
        );

        Ok(Self {
            router,
            generator,
            stream_format: config.generation.stream_format,
        })
    }

    /// Route only, without generating anything.
    pub async fn route(&self, question: &str) -> Result<RouterDecision, MatchError> {
        self.router.decide(question).await
    }

    /// Answer `question`, falling back to generation when no entry is close
    /// enough. `history` only shapes the fallback prompt.
    pub async fn answer(
        &self,
        question: &str,
        history: &[ChatMessage],
    ) -> Result<Answer, MatchError> {
        match self.router.decide(question).await? {
            RouterDecision::Matched { answer, score } => Ok(Answer::Direct {
                response: answer,
                score,
            }),
            RouterDecision::Fallback { near_miss_score } => {
                tracing::debug!(near_miss_score, "no confident match, generating");
                let prompt = build_prompt(question, history);
                Ok(Answer::Stream {
                    near_miss_score,
                    events: self.generator.stream(prompt).boxed(),
                })
            }
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn stream_format(&self) -> StreamFormat {
        self.stream_format
    }

    pub fn knowledge_len(&self) -> usize {
        self.router.index().len()
    }

    pub fn backend_source(&self) -> &str {
        self.generator.source()
    }
}
