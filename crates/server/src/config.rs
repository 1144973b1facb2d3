use faqroute::{AssistantConfig, GenerationConfig};
use generate::BackendConfig;
use matcher::MatchConfig;
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable the backend key is read from when none is configured.
pub const FALLBACK_API_KEY_VAR: &str = "API_KEY";

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Time allowed to produce response headers, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Knowledge base JSON file
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: PathBuf,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub matcher: MatchConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            knowledge_base: default_knowledge_base(),
            semantic: SemanticConfig::default(),
            matcher: MatchConfig::default(),
            backend: BackendConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `faqroute.{toml,yaml,json}`
    /// file and `FAQROUTE__*` environment variables, in increasing priority.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("faqroute").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("FAQROUTE").separator("__"));

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;
        config.apply_api_key_fallback(std::env::var(FALLBACK_API_KEY_VAR).ok());
        Ok(config)
    }

    /// Use `key` as the backend credential unless one is already configured.
    pub fn apply_api_key_fallback(&mut self, key: Option<String>) {
        let configured = self
            .backend
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if configured {
            return;
        }
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            tracing::debug!("using {} as backend api key", FALLBACK_API_KEY_VAR);
            self.backend.api_key = Some(key);
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The pipeline part of the configuration.
    pub fn assistant_config(&self) -> AssistantConfig {
        AssistantConfig {
            knowledge_base: self.knowledge_base.clone(),
            semantic: self.semantic.clone(),
            matcher: self.matcher,
            backend: self.backend.clone(),
            generation: self.generation.clone(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_knowledge_base() -> PathBuf {
    PathBuf::from("knowledge_base.json")
}
