use serde::{Deserialize, Serialize};

/// One unit of the fallback stream.
///
/// Serialized as an internally tagged object, e.g. `{"type":"chunk","content":" not"}`
/// or `{"type":"end"}`. A well-formed stream is `Start Chunk* Error? End`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Start { source: String },
    Chunk { content: String },
    Error { message: String },
    End,
}

impl StreamEvent {
    pub fn start(source: impl Into<String>) -> Self {
        StreamEvent::Start {
            source: source.into(),
        }
    }

    pub fn chunk(content: impl Into<String>) -> Self {
        StreamEvent::Chunk {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }
}

/// Wire framing for a serialized event stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    /// One JSON object per line.
    #[default]
    Ndjson,
    /// Server-sent events: `data: {json}` followed by a blank line.
    Sse,
}

impl StreamFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            StreamFormat::Ndjson => "application/x-ndjson",
            StreamFormat::Sse => "text/event-stream",
        }
    }

    /// Frame one event for the wire.
    pub fn encode(self, event: &StreamEvent) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(event)?;
        Ok(match self {
            StreamFormat::Ndjson => format!("{json}\n"),
            StreamFormat::Sse => format!("data: {json}\n\n"),
        })
    }
}

impl std::str::FromStr for StreamFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ndjson" | "jsonl" => Ok(StreamFormat::Ndjson),
            "sse" | "event-stream" => Ok(StreamFormat::Sse),
            other => Err(format!("unknown stream format `{other}`")),
        }
    }
}
