use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use super::{FragmentStream, GenerativeBackend};
use crate::GenerateError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fault {
    /// `stream_complete` itself fails.
    Refuse(String),
    /// Yield an error after this many fragments.
    FailAfter(usize, String),
    /// Stop producing (without ending) after this many fragments.
    StallAfter(usize),
}

/// Backend that replays a fixed list of fragments.
///
/// Useful offline and in tests. Faults can be injected to exercise the error
/// and timeout paths of the generator.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    source: String,
    fragments: Vec<String>,
    fragment_delay: Duration,
    fault: Option<Fault>,
}

impl ScriptedBackend {
    pub fn new<I, S>(source: impl Into<String>, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            fragments: fragments.into_iter().map(Into::into).collect(),
            fragment_delay: Duration::ZERO,
            fault: None,
        }
    }

    /// Sleep this long before each fragment.
    pub fn with_fragment_delay(mut self, delay: Duration) -> Self {
        self.fragment_delay = delay;
        self
    }

    pub fn refuse(mut self, message: impl Into<String>) -> Self {
        self.fault = Some(Fault::Refuse(message.into()));
        self
    }

    pub fn fail_after(mut self, fragments: usize, message: impl Into<String>) -> Self {
        self.fault = Some(Fault::FailAfter(fragments, message.into()));
        self
    }

    pub fn stall_after(mut self, fragments: usize) -> Self {
        self.fault = Some(Fault::StallAfter(fragments));
        self
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    fn source(&self) -> &str {
        &self.source
    }

    async fn stream_complete(&self, _prompt: &str) -> Result<FragmentStream, GenerateError> {
        let limit = match &self.fault {
            Some(Fault::Refuse(message)) => {
                return Err(GenerateError::Unavailable(message.clone()));
            }
            Some(Fault::FailAfter(n, _)) | Some(Fault::StallAfter(n)) => *n,
            None => usize::MAX,
        };

        let delay = self.fragment_delay;
        let head = stream::iter(self.fragments.clone().into_iter().take(limit)).then(
            move |fragment| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(fragment)
            },
        );

        Ok(match self.fault.clone() {
            Some(Fault::FailAfter(_, message)) => head
                .chain(stream::once(async move {
                    Err(GenerateError::Unavailable(message))
                }))
                .boxed(),
            Some(Fault::StallAfter(_)) => head.chain(stream::pending()).boxed(),
            _ => head.boxed(),
        })
    }
}
