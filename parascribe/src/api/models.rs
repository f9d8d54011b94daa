//! API request/response models.

use serde::{Deserialize, Serialize};

use crate::jobs::Job;

/// Request body for submitting a translation job.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitJobRequest {
    /// Path to the media asset on the server.
    pub asset_path: String,
    /// Target language code; omit to transcribe without translating.
    pub target_language: Option<String>,
    /// Requested parallelism degree; clamped to the worker pool size.
    pub workers: Option<usize>,
}

/// Response for a submitted job.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
}

/// Response for the job list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    pub total: usize,
}

/// Response for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}
