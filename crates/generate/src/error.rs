use thiserror::Error;

/// Failures of a generative backend.
///
/// None of these escape a [`StreamingGenerator`](crate::StreamingGenerator):
/// they become a single `Error` event followed by `End`. The `Display` text
/// is what the client sees as the event message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("timeout")]
    Timeout,
    #[error("malformed backend response: {0}")]
    Malformed(String),
    #[error("invalid backend config: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerateError::Timeout
        } else if err.is_decode() {
            GenerateError::Malformed(err.to_string())
        } else {
            GenerateError::Unavailable(err.to_string())
        }
    }
}
