//! Distribution coordination: chunk planning, scatter/gather lifecycle,
//! failure policy, and ordered aggregation.
//!
//! The coordinator owns one full phase per job: plan chunks, scatter them
//! 1:1 over a worker group, gather every unit result under the phase
//! deadline, and merge. Fallback to single-node execution reuses the same
//! path with one participant and one chunk, so output shape never depends on
//! whether distribution was used.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use fanout::{FanoutConfig, FanoutError, WorkerGroup};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub mod aggregate;
pub mod executor;
pub mod planner;
pub mod types;

pub use executor::{UnitContext, UnitExecutor};
pub use types::{Chunk, Segment, Transcript, UnitOutcome, UnitResult};

use crate::cache::TranscriptCache;
use crate::config::CoordinatorConfig;
use crate::jobs::{JobManager, JobUpdate};
use crate::media::DurationProbe;
use crate::{Error, Result};

/// A submitted unit of work for the coordinator.
#[derive(Debug, Clone)]
pub struct TranslateJobRequest {
    pub job_id: String,
    pub asset: PathBuf,
    pub target_language: Option<String>,
    /// Requested parallelism; clamped to group capacity.
    pub workers: Option<usize>,
}

/// Coordinates the fan-out/fan-in pipeline for submitted jobs.
pub struct Coordinator {
    config: CoordinatorConfig,
    fanout: FanoutConfig,
    cache_ttl: Duration,
    probe: Arc<dyn DurationProbe>,
    executor: Arc<UnitExecutor>,
    cache: Arc<dyn TranscriptCache>,
    jobs: Arc<JobManager>,
}

impl Coordinator {
    pub fn new(
        config: CoordinatorConfig,
        fanout: FanoutConfig,
        cache_ttl: Duration,
        probe: Arc<dyn DurationProbe>,
        executor: Arc<UnitExecutor>,
        cache: Arc<dyn TranscriptCache>,
        jobs: Arc<JobManager>,
    ) -> Self {
        Self {
            config,
            fanout,
            cache_ttl,
            probe,
            executor,
            cache,
            jobs,
        }
    }

    /// Drive a submitted job to a terminal state.
    ///
    /// Every fatal condition is converted into a terminal `Failed` update
    /// here; callers poll job state and never receive a raised fault.
    pub async fn run_job(&self, request: TranslateJobRequest) {
        let job_id = request.job_id.clone();
        match self.run(&request).await {
            Ok(transcript) => {
                info!(
                    %job_id,
                    segments = transcript.total_segments,
                    participants = transcript.participants_used,
                    "job completed"
                );
                let _ = self
                    .jobs
                    .update(&job_id, JobUpdate::completed(transcript))
                    .await;
            }
            Err(e) => {
                error!(%job_id, error = %e, "job failed");
                let _ = self.jobs.update(&job_id, JobUpdate::failed(e.to_string())).await;
            }
        }
    }

    /// Execute one full phase and return the merged transcript.
    pub async fn run(&self, request: &TranslateJobRequest) -> Result<Transcript> {
        let job_id = request.job_id.as_str();
        let asset_key = request.asset.to_string_lossy().to_string();
        let target = request.target_language.as_deref();

        // Cache is probed before any planning; an outage reads as a miss.
        if let Some(hit) = self.cache.get(&asset_key, target).await {
            info!(%job_id, "transcript cache hit, skipping pipeline");
            return Ok(hit);
        }

        self.report(job_id, 5, "probing asset duration").await;
        let duration_secs = self.probe.duration_secs(&request.asset).await?;

        let (group, workers) = self.establish_group(duration_secs, request.workers);
        let chunks = planner::plan(&request.asset, duration_secs, workers)?;
        let total = chunks.len();
        self.report(
            job_id,
            10,
            format!("dispatching {} chunk(s) to {} participant(s)", total, workers),
        )
        .await;

        // Per-unit completions stream into job state without blocking the
        // gather loop.
        let (progress_tx, mut progress_rx) = mpsc::channel::<usize>(total.max(1));
        let pump = {
            let jobs = self.jobs.clone();
            let job_id = request.job_id.clone();
            tokio::spawn(async move {
                while let Some(done) = progress_rx.recv().await {
                    let progress = (10 + done * 80 / total.max(1)) as u8;
                    let _ = jobs
                        .update(
                            &job_id,
                            JobUpdate::running(
                                progress,
                                format!("{}/{} chunks transcribed", done, total),
                            ),
                        )
                        .await;
                }
            })
        };

        let completed = Arc::new(AtomicUsize::new(0));
        let outcome = {
            let executor = self.executor.clone();
            let job_id = request.job_id.clone();
            let target_language = request.target_language.clone();
            let completed = completed.clone();
            group
                .scatter_gather_with(
                    chunks,
                    move |participant, chunk| {
                        let executor = executor.clone();
                        let ctx = UnitContext {
                            job_id: job_id.clone(),
                            participant,
                            target_language: target_language.clone(),
                        };
                        async move { executor.execute(&ctx, &chunk).await }
                    },
                    move |done| {
                        completed.store(done, Ordering::Relaxed);
                        let _ = progress_tx.try_send(done);
                    },
                )
                .await
        };
        // The progress sender dropped with the gather call; drain the pump so
        // late running updates cannot race the terminal one.
        let _ = pump.await;

        let results = outcome
            .map_err(|e| map_fanout_error(e, completed.load(Ordering::Relaxed), total))?;

        self.report(job_id, 95, "aggregating transcript").await;
        let failures: Vec<String> = results
            .iter()
            .filter_map(|r| r.error().map(|e| format!("chunk {}: {}", r.chunk_id, e)))
            .collect();
        if !failures.is_empty() {
            // A failed chunk leaves an un-fillable gap in the timeline; the
            // job fails even though sibling chunks succeeded.
            return Err(Error::pipeline(format!(
                "transcript coverage incomplete: {}",
                failures.join("; ")
            )));
        }

        let transcript = aggregate::merge(results);
        self.cache
            .put(&asset_key, target, &transcript, self.cache_ttl)
            .await;
        Ok(transcript)
    }

    /// Decide the parallelism degree and establish the worker group.
    ///
    /// Short assets and unavailable groups degrade to a local
    /// single-participant group; the caller runs the identical pipeline
    /// either way.
    fn establish_group(&self, duration_secs: f64, requested: Option<usize>) -> (WorkerGroup, usize) {
        let phase_timeout = self.fanout.phase_timeout();
        let requested = requested.unwrap_or(self.config.default_workers).max(1);

        if requested == 1 || duration_secs < self.config.parallel_threshold_secs {
            debug!(
                duration_secs,
                "single-node execution: below parallel threshold or one worker requested"
            );
            return (WorkerGroup::single(phase_timeout), 1);
        }

        match WorkerGroup::connect(&self.fanout) {
            Ok(group) => {
                let workers = requested.min(group.capacity());
                (group, workers)
            }
            Err(e) => {
                warn!(error = %e, "worker group unavailable, falling back to single-node execution");
                (WorkerGroup::single(phase_timeout), 1)
            }
        }
    }

    async fn report(&self, job_id: &str, progress: u8, message: impl Into<String>) {
        let updated = self
            .jobs
            .update(job_id, JobUpdate::running(progress, message))
            .await
            .unwrap_or(false);
        if !updated {
            debug!(%job_id, "progress update dropped (unknown or terminal job)");
        }
    }
}

fn map_fanout_error(err: FanoutError, completed: usize, total: usize) -> Error {
    match err {
        FanoutError::Timeout { timeout } => Error::PhaseTimeout {
            timeout_secs: timeout.as_secs(),
            completed,
            total,
        },
        FanoutError::Unavailable(reason) => Error::DistributionUnavailable(reason),
        FanoutError::ParticipantLost { reason } => {
            Error::pipeline(format!("participant lost mid-phase: {}", reason))
        }
    }
}
