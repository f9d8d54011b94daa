//! Core data model for the scatter/gather pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A contiguous time-bounded slice of the source asset, assigned to one
/// participant. Immutable once planned.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// 0-based contiguous ordinal.
    pub chunk_id: usize,
    /// Inclusive start in asset time.
    pub start_secs: f64,
    /// Exclusive end in asset time.
    pub end_secs: f64,
    /// The asset this chunk belongs to.
    pub asset: PathBuf,
}

impl Chunk {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// One transcript segment, in absolute asset time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_secs: f64,
    pub end_secs: f64,
    /// Source-language text.
    pub text: String,
    /// Translated text; on translation degradation this carries the source
    /// text forward instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
}

/// Outcome of a single unit execution.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    Ok,
    Failed { error: String },
}

/// The result one participant reports for its chunk.
///
/// A failed unit is data, not a fault: the coordinator gathers it like any
/// other reply and the failure policy applies at aggregation time.
#[derive(Debug, Clone)]
pub struct UnitResult {
    pub chunk_id: usize,
    /// Segments in absolute asset time, non-decreasing in `start_secs`.
    pub segments: Vec<Segment>,
    pub detected_language: String,
    pub outcome: UnitOutcome,
}

impl UnitResult {
    pub fn ok(chunk_id: usize, segments: Vec<Segment>, detected_language: String) -> Self {
        Self {
            chunk_id,
            segments,
            detected_language,
            outcome: UnitOutcome::Ok,
        }
    }

    pub fn failed(chunk_id: usize, error: impl Into<String>) -> Self {
        Self {
            chunk_id,
            segments: Vec::new(),
            detected_language: "unknown".to_string(),
            outcome: UnitOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, UnitOutcome::Ok)
    }

    /// The failure message, if the unit failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            UnitOutcome::Ok => None,
            UnitOutcome::Failed { error } => Some(error),
        }
    }
}

/// The merged, globally time-ordered output of all chunks of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Segments sorted by `start_secs`, ties in planned chunk order.
    pub segments: Vec<Segment>,
    pub detected_language: String,
    pub total_segments: usize,
    pub participants_used: usize,
}
