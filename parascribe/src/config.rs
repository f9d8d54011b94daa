//! Service configuration.
//!
//! Every section has sensible defaults; `from_env_or_default` applies
//! environment overrides on top so deployments configure the service without
//! a config file.

use fanout::FanoutConfig;
use serde::{Deserialize, Serialize};

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiServerConfig {
    /// Server bind address.
    pub bind_address: String,
    /// Server port.
    pub port: u16,
    /// Enable CORS.
    pub enable_cors: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8750,
            enable_cors: true,
        }
    }
}

/// Coordinator policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Parallelism degree when a submission does not request one.
    pub default_workers: usize,
    /// Assets shorter than this run as a single chunk; the parallelism
    /// overhead outweighs the benefit below it.
    pub parallel_threshold_secs: f64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_workers: 3,
            parallel_threshold_secs: 60.0,
        }
    }
}

/// Endpoints for the external transcription and translation services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the speech-to-text service.
    pub stt_url: String,
    /// Base URL of the translation service.
    pub translate_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stt_url: "http://127.0.0.1:9000".to_string(),
            translate_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Paths to the media toolchain binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to the ffmpeg binary.
    pub ffmpeg_path: String,
    /// Path to the ffprobe binary.
    pub ffprobe_path: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

/// Transcript cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for cached transcripts in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

/// Job record retention configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRetentionConfig {
    /// How long a job record stays retrievable after its last update.
    pub ttl_secs: u64,
    /// Interval between retention sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for JobRetentionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 3600,
            sweep_interval_secs: 300,
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub api: ApiServerConfig,
    pub coordinator: CoordinatorConfig,
    pub fanout: FanoutConfig,
    pub engines: EngineConfig,
    pub media: MediaConfig,
    pub cache: CacheConfig,
    pub jobs: JobRetentionConfig,
}

impl ServiceConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    ///
    /// Supported env vars:
    /// - `PARASCRIBE_BIND_ADDRESS`, `PARASCRIBE_PORT`
    /// - `PARASCRIBE_WORKERS`, `PARASCRIBE_PHASE_TIMEOUT_SECS`
    /// - `PARASCRIBE_FANOUT_ENABLED`, `PARASCRIBE_MAX_PARTICIPANTS`
    /// - `PARASCRIBE_STT_URL`, `PARASCRIBE_TRANSLATE_URL`
    /// - `FFMPEG_PATH`, `FFPROBE_PATH`
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(bind_address) = std::env::var("PARASCRIBE_BIND_ADDRESS")
            && !bind_address.trim().is_empty()
        {
            config.api.bind_address = bind_address;
        }

        if let Ok(port) = std::env::var("PARASCRIBE_PORT")
            && let Ok(parsed) = port.parse::<u16>()
        {
            config.api.port = parsed;
        }

        if let Ok(workers) = std::env::var("PARASCRIBE_WORKERS")
            && let Ok(parsed) = workers.parse::<usize>()
            && parsed > 0
        {
            config.coordinator.default_workers = parsed;
        }

        if let Ok(timeout) = std::env::var("PARASCRIBE_PHASE_TIMEOUT_SECS")
            && let Ok(parsed) = timeout.parse::<u64>()
            && parsed > 0
        {
            config.fanout.phase_timeout_secs = parsed;
        }

        if let Ok(enabled) = std::env::var("PARASCRIBE_FANOUT_ENABLED")
            && let Ok(parsed) = enabled.parse::<bool>()
        {
            config.fanout.enabled = parsed;
        }

        if let Ok(participants) = std::env::var("PARASCRIBE_MAX_PARTICIPANTS")
            && let Ok(parsed) = participants.parse::<usize>()
        {
            config.fanout.max_participants = parsed;
        }

        if let Ok(url) = std::env::var("PARASCRIBE_STT_URL")
            && !url.trim().is_empty()
        {
            config.engines.stt_url = url;
        }

        if let Ok(url) = std::env::var("PARASCRIBE_TRANSLATE_URL")
            && !url.trim().is_empty()
        {
            config.engines.translate_url = url;
        }

        if let Ok(path) = std::env::var("FFMPEG_PATH")
            && !path.trim().is_empty()
        {
            config.media.ffmpeg_path = path;
        }

        if let Ok(path) = std::env::var("FFPROBE_PATH")
            && !path.trim().is_empty()
        {
            config.media.ffprobe_path = path;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let config = ServiceConfig::default();
        assert_eq!(config.coordinator.default_workers, 3);
        assert_eq!(config.coordinator.parallel_threshold_secs, 60.0);
        assert_eq!(config.fanout.phase_timeout_secs, 600);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.jobs.ttl_secs, 86400);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ServiceConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ServiceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.api.port, config.api.port);
        assert_eq!(parsed.fanout.max_participants, config.fanout.max_participants);
    }
}
