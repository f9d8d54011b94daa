//! Job submission and status routes.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/api/jobs` | Submit an asset for transcription/translation |
//! | GET | `/api/jobs` | List retained jobs |
//! | GET | `/api/jobs/{id}` | Get a job record by id |
//!
//! Submissions return immediately; the pipeline runs in the background and
//! callers poll the job record for progress and the final transcript. Only
//! the aggregate job fields are exposed, never chunk-level internals.

use std::path::PathBuf;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{JobListResponse, SubmitJobRequest, SubmitJobResponse};
use crate::api::server::AppState;
use crate::coordinator::TranslateJobRequest;
use crate::jobs::Job;

/// Create the jobs router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs).post(submit_job))
        .route("/{id}", get(get_job))
}

/// Submit a media asset for processing.
///
/// Returns `202 Accepted` with the job id; poll `GET /api/jobs/{id}` for
/// progress and the result.
async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    if request.asset_path.trim().is_empty() {
        return Err(ApiError::validation("asset_path must not be empty"));
    }
    if let Some(workers) = request.workers
        && workers == 0
    {
        return Err(ApiError::validation("workers must be positive"));
    }

    let asset = PathBuf::from(&request.asset_path);
    if tokio::fs::metadata(&asset).await.is_err() {
        return Err(ApiError::validation(format!(
            "asset not found: {}",
            request.asset_path
        )));
    }

    let asset_name = asset
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| request.asset_path.clone());

    let job_id = state
        .jobs
        .create(asset_name, request.target_language.clone())
        .await
        .map_err(ApiError::from)?;

    info!(%job_id, asset = %request.asset_path, "job submitted");

    let coordinator = state.coordinator.clone();
    let job_request = TranslateJobRequest {
        job_id: job_id.clone(),
        asset,
        target_language: request.target_language,
        workers: request.workers,
    };
    tokio::spawn(async move {
        coordinator.run_job(job_request).await;
    });

    Ok((StatusCode::ACCEPTED, Json(SubmitJobResponse { job_id })))
}

/// Get a job record by id.
async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Job>> {
    state
        .jobs
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("job with id '{}' not found", id)))
}

/// List retained jobs, unordered; for operational visibility.
async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<JobListResponse>> {
    let jobs = state.jobs.list().await.map_err(ApiError::from)?;
    let total = jobs.len();
    Ok(Json(JobListResponse { jobs, total }))
}
