//! Asset duration probing via ffprobe.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{Error, Result};

/// Reports the playable duration of a media asset.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn duration_secs(&self, asset: &Path) -> Result<f64>;
}

/// ffprobe-backed duration probe.
pub struct FfprobeDurationProbe {
    ffprobe_path: String,
}

impl FfprobeDurationProbe {
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn duration_secs(&self, asset: &Path) -> Result<f64> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "csv=p=0",
            ])
            .arg(asset)
            .output()
            .await
            .map_err(|e| Error::Other(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::pipeline(format!(
                "ffprobe failed for {}: {}",
                asset.display(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.trim().parse::<f64>().map_err(|_| {
            Error::pipeline(format!(
                "ffprobe returned an unparsable duration for {}: '{}'",
                asset.display(),
                stdout.trim()
            ))
        })
    }
}
