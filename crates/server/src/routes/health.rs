use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "faqroute-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// State only exists once the knowledge base is indexed, so reaching this
/// handler means the service can answer.
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let assistant = &state.assistant;
    Ok(Json(json!({
        "status": "ready",
        "service": "faqroute-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "knowledge_base": {
                "entries": assistant.knowledge_len(),
                "dimension": assistant.router().index().dimension(),
            },
            "matcher": {
                "threshold": assistant.router().config().threshold,
            },
            "backend": {
                "source": assistant.backend_source(),
                "stream_format": assistant.stream_format(),
            },
        }
    })))
}
