use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use faqroute::AssistantError;
use index::IndexError;
use matcher::MatchError;
use semantic::SemanticError;
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Request timeout")]
    Timeout,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] SemanticError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Startup failed: {0}")]
    Startup(#[from] AssistantError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Embedding(_) => StatusCode::BAD_GATEWAY,
            ServerError::Index(_)
            | ServerError::Startup(_)
            | ServerError::Internal(_)
            | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Timeout => "REQUEST_TIMEOUT",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Embedding(_) => "EMBEDDING_ERROR",
            ServerError::Index(_) => "INDEX_ERROR",
            ServerError::Startup(_) => "STARTUP_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }

        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<MatchError> for ServerError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::Embedding(e) => ServerError::Embedding(e),
            MatchError::Index(e) => ServerError::Index(e),
            MatchError::InvalidConfig(msg) => ServerError::Config(msg),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_errors_map_to_http_codes() {
        let err: ServerError =
            MatchError::Embedding(SemanticError::Unavailable("down".into())).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "EMBEDDING_ERROR");

        let err: ServerError = MatchError::Index(IndexError::DimensionMismatch {
            expected: 384,
            got: 16,
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "INDEX_ERROR");
    }

    #[test]
    fn bad_request_is_400() {
        let err = ServerError::BadRequest("missing field".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeout_is_408_with_code() {
        let err = ServerError::Timeout;
        assert_eq!(err.error_code(), "REQUEST_TIMEOUT");
        assert_eq!(err.into_response().status(), StatusCode::REQUEST_TIMEOUT);
    }
}
