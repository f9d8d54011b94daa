//! Audio segment extraction via ffmpeg.
//!
//! Each work unit extracts the audio of its own time range into a scoped
//! workspace as mono 16 kHz PCM, the input format the speech-to-text service
//! expects.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result};

/// Extracts the audio of one time range of an asset into a WAV file.
#[async_trait]
pub trait SegmentExtractor: Send + Sync {
    async fn extract(
        &self,
        asset: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> Result<()>;
}

/// ffmpeg-backed segment extractor.
pub struct FfmpegSegmentExtractor {
    ffmpeg_path: String,
}

impl FfmpegSegmentExtractor {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Build the ffmpeg argument list for one extraction.
    pub fn build_args(
        &self,
        asset: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-nostats".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            start_secs.to_string(),
            "-to".to_string(),
            end_secs.to_string(),
            "-i".to_string(),
            asset.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-acodec".to_string(),
            "pcm_s16le".to_string(),
            "-ar".to_string(),
            "16000".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl SegmentExtractor for FfmpegSegmentExtractor {
    async fn extract(
        &self,
        asset: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> Result<()> {
        let args = self.build_args(asset, start_secs, end_secs, output);
        debug!(?args, "running ffmpeg audio extraction");

        let command_output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .env("LC_ALL", "C")
            .output()
            .await
            .map_err(|e| Error::Other(format!("Failed to run ffmpeg: {}", e)))?;

        if !command_output.status.success() {
            let stderr = String::from_utf8_lossy(&command_output.stderr);
            return Err(Error::pipeline(format!(
                "ffmpeg exited with code {} extracting [{:.2}s, {:.2}s) of {}: {}",
                command_output.status.code().unwrap_or(-1),
                start_secs,
                end_secs,
                asset.display(),
                stderr.trim()
            )));
        }

        Ok(())
    }
}
