use thiserror::Error;

/// Errors surfaced while turning text into an [`Embedding`](crate::Embedding).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SemanticError {
    /// Configuration is inconsistent (unknown mode, missing API URL, zero dimension).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// The embedding endpoint could not be reached or answered with a failure status.
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),
    /// The endpoint answered but the payload was not a usable embedding.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),
    /// The backend returned a different number of vectors than inputs.
    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

impl SemanticError {
    /// Whether a retry of the same request might succeed.
    ///
    /// Transport failures and 5xx/429 statuses are transient; configuration and
    /// shape errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SemanticError::Unavailable(message) => is_retryable_message(message),
            SemanticError::InvalidConfig(_)
            | SemanticError::MalformedResponse(_)
            | SemanticError::CountMismatch { .. } => false,
        }
    }
}

/// Classify a transport error message by the HTTP status or network failure it mentions.
pub(crate) fn is_retryable_message(message: &str) -> bool {
    let lower = message.to_lowercase();

    if lower.contains("timeout")
        || lower.contains("connection")
        || lower.contains("reset")
        || lower.contains("refused")
        || lower.contains("dns")
    {
        return true;
    }

    if ["500", "502", "503", "504", "429"]
        .iter()
        .any(|code| lower.contains(code))
    {
        return true;
    }

    if ["400", "401", "403", "404", "422"]
        .iter()
        .any(|code| lower.contains(code))
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config() {
        let err = SemanticError::InvalidConfig("api_url is required".into());
        assert!(err.to_string().contains("invalid semantic config"));
        assert!(err.to_string().contains("api_url is required"));
    }

    #[test]
    fn error_count_mismatch_mentions_both_sides() {
        let err = SemanticError::CountMismatch {
            expected: 3,
            actual: 1,
        };
        let text = err.to_string();
        assert!(text.contains("expected 3"));
        assert!(text.contains("got 1"));
    }

    #[test]
    fn transient_statuses_are_retryable() {
        assert!(SemanticError::Unavailable("HTTP error 503 Service Unavailable".into()).is_retryable());
        assert!(SemanticError::Unavailable("HTTP error 429 Too Many Requests".into()).is_retryable());
        assert!(SemanticError::Unavailable("connection refused".into()).is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!SemanticError::Unavailable("HTTP error 401 Unauthorized".into()).is_retryable());
        assert!(!SemanticError::Unavailable("HTTP error 404 Not Found".into()).is_retryable());
        assert!(!SemanticError::MalformedResponse("not an array".into()).is_retryable());
        assert!(!SemanticError::InvalidConfig("bad".into()).is_retryable());
    }
}
