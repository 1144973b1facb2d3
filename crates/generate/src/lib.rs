//! # faqroute generate (`generate`)
//!
//! Fallback answer generation for questions the knowledge base could not
//! answer with confidence.
//!
//! The crate is split into independent stages:
//!
//! - [`GenerativeBackend`] produces a lazy stream of raw text fragments.
//!   [`GeminiBackend`], [`OllamaBackend`] and [`ScriptedBackend`] ship here;
//!   [`build_backend`] picks one from a [`BackendConfig`].
//! - [`split_words`] cuts each fragment into word pieces whose concatenation
//!   is the fragment itself.
//! - [`Pacing`] decides how long to wait before each chunk.
//! - [`StreamingGenerator`] ties them together and emits [`StreamEvent`]s in
//!   the order `Start Chunk* Error? End`. Backend failures and timeouts never
//!   escape as errors; they surface as one `Error` event followed by `End`.
//! - [`StreamFormat`] frames events for the wire (NDJSON or SSE).
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use futures::StreamExt;
//! use generate::{Pacing, ScriptedBackend, StreamFormat, StreamingGenerator};
//!
//! # async fn demo() {
//! let backend = Arc::new(ScriptedBackend::new("demo", ["I'm not sure."]));
//! let generator = StreamingGenerator::new(backend)
//!     .with_pacing(Pacing::fixed(Duration::from_millis(50)))
//!     .with_deadline(Duration::from_secs(30));
//!
//! let mut events = Box::pin(generator.stream("How do I expense a taxi?"));
//! while let Some(event) = events.next().await {
//!     print!("{}", StreamFormat::Ndjson.encode(&event).unwrap());
//! }
//! # }
//! ```

mod backend;
mod error;
mod event;
mod generator;
mod pacing;
mod split;

pub use crate::backend::{
    build_backend, BackendConfig, FragmentStream, GeminiBackend, GenerativeBackend,
    OllamaBackend, ScriptedBackend,
};
pub use crate::error::GenerateError;
pub use crate::event::{StreamEvent, StreamFormat};
pub use crate::generator::StreamingGenerator;
pub use crate::pacing::{Pacing, DEFAULT_CHUNK_DELAY};
pub use crate::split::split_words;
