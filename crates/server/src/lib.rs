//! faqroute server - HTTP API for the match-or-generate question router
//!
//! Questions posted to `/ask` are answered straight from the curated
//! knowledge base when a stored question is similar enough. Otherwise the
//! answer is generated and streamed back as tagged JSON events.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - service information
//! - `GET /health` - liveness probe
//! - `GET /ready` - readiness probe with knowledge-base size and backend
//! - `POST /ask` (alias `POST /api/v1/ask`) - answer a question
//!
//! A matched question returns one JSON object:
//!
//! ```json
//! {"response": "Go to Settings > Security > Reset Password.", "source": "index-match", "score": 0.85}
//! ```
//!
//! Anything else returns `application/x-ndjson` (or `text/event-stream`):
//!
//! ```text
//! {"type":"start","source":"gemini"}
//! {"type":"chunk","content":"I'm"}
//! {"type":"chunk","content":" not"}
//! {"type":"chunk","content":" sure."}
//! {"type":"end"}
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
