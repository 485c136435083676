//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

/// `GET /health`
pub async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `GET /health/ready`
///
/// Pings the database; 503 when it is unreachable.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.accounts().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
