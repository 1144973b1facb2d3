use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::{Body, Bytes};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use faqroute::{Answer, ChatMessage};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Source label for answers served straight from the knowledge base.
pub const INDEX_MATCH_SOURCE: &str = "index-match";

/// Question with optional prior conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,

    /// Earlier turns, used only to shape a generated answer
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Body returned when the knowledge base answered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedResponse {
    pub response: String,
    pub source: String,
    pub score: f32,
}

/// Answer a question.
///
/// Returns a single JSON object for a knowledge-base match, or a stream of
/// framed [`StreamEvent`](faqroute::StreamEvent)s for the generative fallback.
/// Backend failures during streaming arrive as an `error` event, never as an
/// HTTP error; embedding and index failures are reported before any body is
/// sent.
pub async fn ask(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> ServerResult<Response> {
    let Json(request) = payload?;

    match state
        .assistant
        .answer(&request.question, &request.messages)
        .await?
    {
        Answer::Direct { response, score } => {
            tracing::info!(score, "answered from knowledge base");
            Ok(Json(MatchedResponse {
                response,
                source: INDEX_MATCH_SOURCE.to_string(),
                score,
            })
            .into_response())
        }
        Answer::Stream {
            near_miss_score,
            events,
        } => {
            let format = state.assistant.stream_format();
            tracing::info!(
                near_miss_score,
                source = state.assistant.backend_source(),
                "streaming generated answer"
            );
            let body = events.map(move |event| format.encode(&event).map(Bytes::from));
            Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, format.content_type())
                .header(CACHE_CONTROL, "no-cache")
                .body(Body::from_stream(body))
                .map_err(|e| ServerError::Internal(e.to_string()))
        }
    }
}
