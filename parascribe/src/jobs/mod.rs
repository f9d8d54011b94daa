//! Asynchronous job state machine.
//!
//! Jobs move `pending -> running -> {completed, failed}`; terminal states
//! are never left. The [`JobManager`] is the sole writer; status-poll
//! callers only read. Persistence sits behind the [`JobStore`] trait so any
//! coordinator replica backed by the same store reports the same state; the
//! in-memory store mirrors a key-value deployment (namespaced keys, TTL
//! retention).

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::Result;
use crate::coordinator::types::Transcript;

/// Namespace prefix for persisted job records.
pub const JOB_KEY_PREFIX: &str = "job:";

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Submitted, not yet picked up.
    Pending,
    /// The coordinator is driving the phase.
    Running,
    /// Terminal: transcript available in `result`.
    Completed,
    /// Terminal: human-readable reason in `error`.
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The externally observable job record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// 0-100.
    pub progress: u8,
    pub message: String,
    pub asset_name: String,
    pub target_language: Option<String>,
    pub result: Option<Transcript>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial-field update applied by the coordinator pipeline.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub message: Option<String>,
    pub result: Option<Transcript>,
    pub error: Option<String>,
}

impl JobUpdate {
    /// A non-terminal progress update.
    pub fn running(progress: u8, message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Running),
            progress: Some(progress),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Terminal success carrying the aggregate.
    pub fn completed(result: Transcript) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            message: Some("completed".to_string()),
            result: Some(result),
            ..Default::default()
        }
    }

    /// Terminal failure carrying the reason.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            message: Some("failed".to_string()),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Persistence boundary for job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Upsert a record, refreshing its retention window.
    async fn put(&self, job: &Job) -> Result<()>;
    async fn get(&self, job_id: &str) -> Result<Option<Job>>;
    async fn list(&self) -> Result<Vec<Job>>;
}

struct StoredJob {
    job: Job,
    expires_at: Instant,
}

/// In-memory job store with TTL retention.
pub struct InMemoryJobStore {
    entries: DashMap<String, StoredJob>,
    ttl: Duration,
}

impl InMemoryJobStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    fn key(job_id: &str) -> String {
        format!("{}{}", JOB_KEY_PREFIX, job_id)
    }

    /// Drop expired records; returns how many were evicted.
    pub fn evict_expired(&self) -> usize {
        let before = self.entries.len();
        let now = Instant::now();
        self.entries.retain(|_, stored| stored.expires_at > now);
        before - self.entries.len()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, job: &Job) -> Result<()> {
        self.entries.insert(
            Self::key(&job.id),
            StoredJob {
                job: job.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<Job>> {
        let key = Self::key(job_id);
        let Some(entry) = self.entries.get(&key) else {
            return Ok(None);
        };

        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(&key);
            return Ok(None);
        }

        Ok(Some(entry.job.clone()))
    }

    async fn list(&self) -> Result<Vec<Job>> {
        let now = Instant::now();
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.job.clone())
            .collect())
    }
}

/// Periodically evict expired job records until shutdown.
pub fn start_retention_sweeper(
    store: Arc<InMemoryJobStore>,
    interval: Duration,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("retention sweeper shutting down");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let evicted = store.evict_expired();
                    if evicted > 0 {
                        info!(evicted, "evicted expired job records");
                    }
                }
            }
        }
    })
}

/// Service object tracking job lifecycles.
pub struct JobManager {
    store: Arc<dyn JobStore>,
}

impl JobManager {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Allocate a fresh pending job and return its id.
    pub async fn create(
        &self,
        asset_name: impl Into<String>,
        target_language: Option<String>,
    ) -> Result<String> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4().to_string(),
            status: JobStatus::Pending,
            progress: 0,
            message: "job created, waiting to start".to_string(),
            asset_name: asset_name.into(),
            target_language,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        };
        self.store.put(&job).await?;
        debug!(job_id = %job.id, "job created");
        Ok(job.id)
    }

    /// Apply a partial update.
    ///
    /// Returns `false` when the job is unknown or already terminal; callers
    /// treat that as "job not found", not as a wider fault.
    pub async fn update(&self, job_id: &str, update: JobUpdate) -> Result<bool> {
        let Some(mut job) = self.store.get(job_id).await? else {
            return Ok(false);
        };
        if job.status.is_terminal() {
            debug!(%job_id, "update ignored: job already terminal");
            return Ok(false);
        }

        if let Some(status) = update.status {
            job.status = status;
        }
        if let Some(progress) = update.progress {
            job.progress = progress.min(100);
        }
        if let Some(message) = update.message {
            job.message = message;
        }
        if let Some(result) = update.result {
            job.result = Some(result);
        }
        if let Some(error) = update.error {
            job.error = Some(error);
        }
        job.updated_at = Utc::now();

        self.store.put(&job).await?;
        Ok(true)
    }

    pub async fn get(&self, job_id: &str) -> Result<Option<Job>> {
        self.store.get(job_id).await
    }

    /// All retained jobs, unordered; for operational inspection.
    pub async fn list(&self) -> Result<Vec<Job>> {
        self.store.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::types::Transcript;

    fn manager() -> (JobManager, Arc<InMemoryJobStore>) {
        let store = Arc::new(InMemoryJobStore::new(Duration::from_secs(3600)));
        (JobManager::new(store.clone()), store)
    }

    fn transcript() -> Transcript {
        Transcript {
            segments: Vec::new(),
            detected_language: "en".to_string(),
            total_segments: 0,
            participants_used: 2,
        }
    }

    #[tokio::test]
    async fn create_starts_pending_at_zero() {
        let (manager, _) = manager();
        let id = manager.create("video.mp4", Some("es".to_string())).await.unwrap();

        let job = manager.get(&id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0);
        assert_eq!(job.asset_name, "video.mp4");
        assert_eq!(job.target_language.as_deref(), Some("es"));
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn update_round_trips_every_field() {
        let (manager, _) = manager();
        let id = manager.create("video.mp4", None).await.unwrap();

        let updated = manager
            .update(
                &id,
                JobUpdate {
                    status: Some(JobStatus::Running),
                    progress: Some(42),
                    message: Some("2/3 chunks transcribed".to_string()),
                    result: Some(transcript()),
                    error: Some("transient detail".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let job = manager.get(&id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 42);
        assert_eq!(job.message, "2/3 chunks transcribed");
        assert_eq!(job.result.unwrap().participants_used, 2);
        assert_eq!(job.error.as_deref(), Some("transient detail"));
        assert!(job.updated_at >= job.created_at);
    }

    #[tokio::test]
    async fn update_unknown_job_returns_false() {
        let (manager, _) = manager();
        let updated = manager
            .update("missing", JobUpdate::running(10, "hello"))
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn terminal_jobs_are_frozen() {
        let (manager, _) = manager();
        let id = manager.create("video.mp4", None).await.unwrap();

        assert!(manager.update(&id, JobUpdate::failed("boom")).await.unwrap());
        // A late running update must not thaw the record.
        assert!(!manager.update(&id, JobUpdate::running(50, "late")).await.unwrap());

        let job = manager.get(&id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("boom"));
        assert_ne!(job.message, "late");
    }

    #[tokio::test]
    async fn completed_update_pins_progress_to_100() {
        let (manager, _) = manager();
        let id = manager.create("video.mp4", None).await.unwrap();

        manager
            .update(&id, JobUpdate::completed(transcript()))
            .await
            .unwrap();

        let job = manager.get(&id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.result.is_some());
    }

    #[tokio::test]
    async fn progress_is_clamped() {
        let (manager, _) = manager();
        let id = manager.create("video.mp4", None).await.unwrap();

        manager
            .update(&id, JobUpdate::running(250, "overshoot"))
            .await
            .unwrap();
        let job = manager.get(&id).await.unwrap().unwrap();
        assert_eq!(job.progress, 100);
    }

    #[tokio::test]
    async fn list_returns_all_retained_jobs() {
        let (manager, _) = manager();
        let a = manager.create("a.mp4", None).await.unwrap();
        let b = manager.create("b.mp4", None).await.unwrap();

        let jobs = manager.list().await.unwrap();
        assert_eq!(jobs.len(), 2);
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert!(ids.contains(&a.as_str()));
        assert!(ids.contains(&b.as_str()));
    }

    #[tokio::test]
    async fn expired_jobs_are_no_longer_retrievable() {
        let store = Arc::new(InMemoryJobStore::new(Duration::ZERO));
        let manager = JobManager::new(store.clone());
        let id = manager.create("video.mp4", None).await.unwrap();

        assert!(manager.get(&id).await.unwrap().is_none());
        assert!(manager.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sweeper_evicts_expired_records() {
        let store = Arc::new(InMemoryJobStore::new(Duration::ZERO));
        let manager = JobManager::new(store.clone());
        manager.create("video.mp4", None).await.unwrap();

        assert_eq!(store.evict_expired(), 1);
        assert_eq!(store.evict_expired(), 0);
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(InMemoryJobStore::key("abc"), "job:abc");
    }
}
