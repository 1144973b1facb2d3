//! # faqroute matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` sits between the embedding layer (`semantic`) and the knowledge
//! index (`index`). For every incoming question it embeds the text, finds the
//! single closest curated question and decides whether the stored answer is
//! good enough to return verbatim or whether the request should fall back to
//! a generative backend.
//!
//! ## Core Types
//!
//! - [`MatchConfig`]: the similarity threshold (inclusive, default `0.7`).
//! - [`RouterDecision`]: `Matched { answer, score }` or
//!   `Fallback { near_miss_score }`.
//! - [`Router`]: holds shared handles to the index and embedder and produces
//!   decisions. It is cheap to clone and safe to share between tasks.
//! - [`MatchError`]: embedding or index failures surfaced to the caller.
//!
//! Blank questions and an empty index never fail; they fall back with the
//! sentinel [`NO_MATCH_SCORE`].
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use index::{KnowledgeBase, KnowledgeIndex};
//! use matcher::{MatchConfig, Router, RouterDecision};
//! use semantic::HashedEmbedder;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = Arc::new(HashedEmbedder::new("hashed-bow-v1", 384)?);
//! let kb = KnowledgeBase::load("knowledge_base.json")?;
//! let index = Arc::new(KnowledgeIndex::build(kb, embedder.as_ref()).await?);
//!
//! let router = Router::new(index, embedder, MatchConfig::default())?;
//! match router.decide("How do I reset my password?").await? {
//!     RouterDecision::Matched { answer, score } => println!("{answer} ({score:.2})"),
//!     RouterDecision::Fallback { near_miss_score } => {
//!         println!("no confident match, best was {near_miss_score:.2}")
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod engine;
mod types;

pub use crate::engine::Router;
pub use crate::types::{MatchConfig, MatchError, RouterDecision, NO_MATCH_SCORE};
