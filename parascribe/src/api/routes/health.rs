//! Health route.

use axum::{Json, extract::State};

use crate::api::models::HealthResponse;
use crate::api::server::AppState;

/// Liveness endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
