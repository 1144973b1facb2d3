//! Turns a backend's fragment stream into the paced `StreamEvent` protocol.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use tokio::time::Instant;

use crate::backend::{FragmentStream, GenerativeBackend};
use crate::event::StreamEvent;
use crate::pacing::Pacing;
use crate::split::split_words;
use crate::GenerateError;


/// Drives one backend per request and emits `Start Chunk* Error? End`.
///
/// Cheap to clone; every clone shares the backend and pacing policy.
#[derive(Clone)]
pub struct StreamingGenerator {
    backend: Arc<dyn GenerativeBackend>,
    pacing: Pacing,
    deadline: Option<Duration>,
}

impl StreamingGenerator {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            pacing: Pacing::default(),
            deadline: None,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Bound the total time spent waiting on the backend for one request.
    /// Pacing delays do not count against it.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn source(&self) -> &str {
        self.backend.source()
    }

    /// Lazily generate an answer for `prompt`.
    ///
    /// Nothing is requested from the backend until the stream is polled past
    /// `Start`. Dropping the stream drops the backend's fragment stream, which
    /// releases its connection.
    pub fn stream(&self, prompt: impl Into<String>) -> impl Stream<Item = StreamEvent> + Send + 'static {
        let run = Run {
            backend: Arc::clone(&self.backend),
            pacing: self.pacing.clone(),
            budget: self.deadline,
            spent: Duration::ZERO,
            chunks_sent: 0,
            phase: Phase::Idle {
                prompt: prompt.into(),
            },
        };
        stream::unfold(run, Run::step)
    }
}

enum Phase {
    Idle { prompt: String },
    Connecting { prompt: String },
    Streaming {
        fragments: FragmentStream,
        pending: VecDeque<String>,
    },
    Closing,
    Done,
}

struct Run {
    backend: Arc<dyn GenerativeBackend>,
    pacing: Pacing,
    budget: Option<Duration>,
    spent: Duration,
    chunks_sent: usize,
    phase: Phase,
}

impl Run {
    async fn step(mut self) -> Option<(StreamEvent, Self)> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Idle { prompt } => {
                    self.phase = Phase::Connecting { prompt };
                    return Some((StreamEvent::start(self.backend.source()), self));
                }
                Phase::Connecting { prompt } => {
                    let backend = Arc::clone(&self.backend);
                    match self.bounded(backend.stream_complete(&prompt)).await {
                        Ok(fragments) => {
                            self.phase = Phase::Streaming {
                                fragments,
                                pending: VecDeque::new(),
                            };
                        }
                        Err(err) => return Some(self.fail(err)),
                    }
                }
                Phase::Streaming {
                    mut fragments,
                    mut pending,
                } => {
                    if let Some(piece) = pending.pop_front() {
                        let delay = self.pacing.delay(self.chunks_sent);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        self.chunks_sent += 1;
                        self.phase = Phase::Streaming { fragments, pending };
                        return Some((StreamEvent::chunk(piece), self));
                    }

                    let next = self.bounded(async { Ok(fragments.next().await) }).await;
                    match next {
                        Ok(Some(Ok(fragment))) => {
                            pending.extend(split_words(&fragment));
                            self.phase = Phase::Streaming { fragments, pending };
                        }
                        Ok(Some(Err(err))) | Err(err) => {
                            drop(fragments);
                            return Some(self.fail(err));
                        }
                        Ok(None) => {
                            tracing::debug!(
                                source = self.backend.source(),
                                chunks = self.chunks_sent,
                                "generation finished"
                            );
                            return Some((StreamEvent::End, self));
                        }
                    }
                }
                Phase::Closing => return Some((StreamEvent::End, self)),
                Phase::Done => return None,
            }
        }
    }

    /// Await a backend future within what remains of the budget.
    async fn bounded<T>(
        &mut self,
        fut: impl Future<Output = Result<T, GenerateError>>,
    ) -> Result<T, GenerateError> {
        let Some(budget) = self.budget else {
            return fut.await;
        };
        let remaining = budget.saturating_sub(self.spent);
        let started = Instant::now();
        let result = tokio::time::timeout(remaining, fut).await;
        self.spent += started.elapsed();
        result.unwrap_or(Err(GenerateError::Timeout))
    }

    fn fail(mut self, err: GenerateError) -> (StreamEvent, Self) {
        match &err {
            GenerateError::Timeout => tracing::warn!(
                source = self.backend.source(),
                chunks = self.chunks_sent,
                "generation timed out"
            ),
            other => tracing::warn!(
                source = self.backend.source(),
                chunks = self.chunks_sent,
                error = %other,
                "generation failed"
            ),
        }
        self.phase = Phase::Closing;
        (StreamEvent::error(err.to_string()), self)
    }
}
