//! In-process scatter/gather worker group.
//!
//! A [`WorkerGroup`] models a reliable group-communication primitive: scatter
//! one work item to each participant, run every participant concurrently, and
//! gather all results index-aligned under a single phase-wide deadline. There
//! is no mid-flight cancellation of an individual participant; the deadline
//! (or group shutdown) aborts the whole phase.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod group;

pub use group::WorkerGroup;

/// Errors produced by a worker group.
#[derive(Debug, Error)]
pub enum FanoutError {
    /// The group could not be established or cannot host the request.
    #[error("worker group unavailable: {0}")]
    Unavailable(String),

    /// The gather barrier exceeded the phase deadline.
    #[error("gather phase exceeded the {}s deadline", timeout.as_secs())]
    Timeout {
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// A participant terminated without replying (panic or abort).
    #[error("participant lost before replying: {reason}")]
    ParticipantLost { reason: String },
}

/// Configuration for establishing a worker group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Whether the group may be established at all.
    pub enabled: bool,
    /// Maximum number of participants the group can host.
    pub max_participants: usize,
    /// Phase-wide gather deadline in seconds.
    pub phase_timeout_secs: u64,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_participants: 8,
            phase_timeout_secs: 600,
        }
    }
}

impl FanoutConfig {
    /// The phase deadline as a [`Duration`].
    pub fn phase_timeout(&self) -> Duration {
        Duration::from_secs(self.phase_timeout_secs)
    }
}
