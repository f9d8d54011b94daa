//! Ordered aggregation of unit results.

use std::cmp::Ordering;

use super::types::{Transcript, UnitResult};

/// Merge per-chunk results into one globally time-ordered transcript.
///
/// Replies arrive in any order; sorting by `chunk_id` restores the planned
/// order before the stable time sort, so segments with equal timestamps at
/// chunk boundaries keep chunk order. Detected language comes from chunk 0;
/// an empty input yields `"unknown"`.
pub fn merge(mut results: Vec<UnitResult>) -> Transcript {
    results.sort_by_key(|r| r.chunk_id);

    let detected_language = results
        .first()
        .map(|r| r.detected_language.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let participants_used = results.len();

    let mut segments: Vec<_> = results.into_iter().flat_map(|r| r.segments).collect();
    // Stable: ties keep the chunk-ordered concatenation order.
    segments.sort_by(|a, b| {
        a.start_secs
            .partial_cmp(&b.start_secs)
            .unwrap_or(Ordering::Equal)
    });

    Transcript {
        total_segments: segments.len(),
        segments,
        detected_language,
        participants_used,
    }
}
