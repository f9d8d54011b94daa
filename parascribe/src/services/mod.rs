//! Service container for dependency injection.
//!
//! Wires the job store, cache, engines, executor, and coordinator together;
//! everything is an explicit constructor-injected service shared via `Arc`,
//! no ambient globals.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::Result;
use crate::cache::{InMemoryTranscriptCache, TranscriptCache};
use crate::config::ServiceConfig;
use crate::coordinator::{Coordinator, UnitExecutor};
use crate::engine::{HttpSpeechToText, HttpTranslator};
use crate::jobs::{self, InMemoryJobStore, JobManager};
use crate::media::{FfmpegSegmentExtractor, FfprobeDurationProbe};

/// Service container holding the application services.
pub struct ServiceContainer {
    pub config: ServiceConfig,
    pub jobs: Arc<JobManager>,
    pub coordinator: Arc<Coordinator>,
    cancellation_token: CancellationToken,
}

impl ServiceContainer {
    /// Create a new service container from configuration.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        info!("initializing service container");

        let cancellation_token = CancellationToken::new();

        let store = Arc::new(InMemoryJobStore::new(Duration::from_secs(
            config.jobs.ttl_secs,
        )));
        let _sweeper = jobs::start_retention_sweeper(
            store.clone(),
            Duration::from_secs(config.jobs.sweep_interval_secs),
            cancellation_token.child_token(),
        );
        let job_manager = Arc::new(JobManager::new(store));

        let cache: Arc<dyn TranscriptCache> = Arc::new(InMemoryTranscriptCache::new());

        let request_timeout = Duration::from_secs(config.engines.request_timeout_secs);
        let stt = Arc::new(HttpSpeechToText::new(
            config.engines.stt_url.clone(),
            request_timeout,
        )?);
        let translator = Arc::new(HttpTranslator::new(
            config.engines.translate_url.clone(),
            request_timeout,
        )?);

        let executor = Arc::new(UnitExecutor::new(
            Arc::new(FfmpegSegmentExtractor::new(config.media.ffmpeg_path.clone())),
            stt,
            translator,
        ));

        let coordinator = Arc::new(Coordinator::new(
            config.coordinator.clone(),
            config.fanout.clone(),
            Duration::from_secs(config.cache.ttl_secs),
            Arc::new(FfprobeDurationProbe::new(config.media.ffprobe_path.clone())),
            executor,
            cache,
            job_manager.clone(),
        ));

        info!("service container initialized");

        Ok(Self {
            config,
            jobs: job_manager,
            coordinator,
            cancellation_token,
        })
    }

    /// Token observed by background services for graceful shutdown.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Request shutdown of background services.
    pub fn shutdown(&self) {
        info!("shutting down service container");
        self.cancellation_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn container_wires_up_from_default_config() {
        let container = ServiceContainer::new(ServiceConfig::default()).unwrap();
        assert!(container.jobs.list().await.unwrap().is_empty());
        container.shutdown();
        assert!(container.cancellation_token().is_cancelled());
    }
}
