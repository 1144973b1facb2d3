//! Assistant configuration shared by the CLI and the HTTP server.
//!
//! Every section has defaults, so an empty document is a valid config:
//!
//! ```yaml
//! knowledge_base: "knowledge_base.json"
//!
//! semantic:
//!   mode: "hashed"
//!   dimension: 384
//!
//! matcher:
//!   threshold: 0.7
//!
//! backend:
//!   provider: "gemini"
//!   model: "gemini-1.5-flash"
//!
//! generation:
//!   pacing_ms: 50
//!   timeout_secs: 30
//!   stream_format: "ndjson"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use generate::{BackendConfig, Pacing, StreamFormat};
use matcher::MatchConfig;
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};

use crate::AssistantError;

/// Everything needed to build an [`Assistant`](crate::Assistant).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantConfig {
    /// JSON array of `{"question", "answer"}` entries.
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

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            knowledge_base: default_knowledge_base(),
            semantic: SemanticConfig::default(),
            matcher: MatchConfig::default(),
            backend: BackendConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl AssistantConfig {
    pub fn validate(&self) -> Result<(), AssistantError> {
        self.matcher.validate()?;
        if self.generation.timeout_secs == 0 {
            return Err(AssistantError::Config(
                "generation.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Fallback streaming behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Gap between successive chunks in milliseconds; `0` disables pacing.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Upper bound on time spent waiting for the backend per request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub stream_format: StreamFormat,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            timeout_secs: default_timeout_secs(),
            stream_format: StreamFormat::default(),
        }
    }
}

impl GenerationConfig {
    pub fn pacing(&self) -> Pacing {
        if self.pacing_ms == 0 {
            Pacing::none()
        } else {
            Pacing::fixed(Duration::from_millis(self.pacing_ms))
        }
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_knowledge_base() -> PathBuf {
    PathBuf::from("knowledge_base.json")
}

fn default_pacing_ms() -> u64 {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AssistantConfig::default();
        assert_eq!(cfg.knowledge_base, PathBuf::from("knowledge_base.json"));
        assert_eq!(cfg.matcher.threshold, 0.7);
        assert_eq!(cfg.generation.pacing_ms, 50);
        assert_eq!(cfg.generation.stream_format, StreamFormat::Ndjson);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_json_is_default() {
        let cfg: AssistantConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AssistantConfig::default());
    }

    #[test]
    fn nested_overrides() {
        let cfg: AssistantConfig = serde_json::from_str(
            r#"{"matcher":{"threshold":0.8},"generation":{"pacing_ms":0,"stream_format":"sse"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.matcher.threshold, 0.8);
        assert_eq!(cfg.generation.pacing().delay(3), Duration::ZERO);
        assert_eq!(cfg.generation.stream_format, StreamFormat::Sse);
        assert_eq!(cfg.generation.timeout_secs, 30);
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = AssistantConfig::default();
        cfg.matcher.threshold = 3.0;
        assert!(cfg.validate().is_err());

        let mut cfg = AssistantConfig::default();
        cfg.generation.timeout_secs = 0;
        assert!(matches!(cfg.validate(), Err(AssistantError::Config(_))));
    }
}
