use crate::config::ServerConfig;
use crate::error::ServerResult;
use faqroute::Assistant;
use std::sync::Arc;

/// Shared application state
///
/// Everything in here is read-only after startup, so handlers never lock.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Knowledge index, router and fallback generator
    pub assistant: Arc<Assistant>,
}

impl ServerState {
    /// Load the knowledge base and build the assistant described by `config`.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let assistant = Assistant::build(&config.assistant_config()).await?;
        Ok(Self::with_assistant(config, assistant))
    }

    /// Wrap an already-built assistant.
    pub fn with_assistant(config: ServerConfig, assistant: Assistant) -> Self {
        Self {
            config: Arc::new(config),
            assistant: Arc::new(assistant),
        }
    }
}
