//! Deterministic chunk planning.

use std::path::Path;

use super::types::Chunk;
use crate::{Error, Result};

/// Partition `[0, duration)` into `workers` contiguous, non-overlapping
/// chunks of equal duration; the final chunk absorbs rounding error.
///
/// Pure function: the partition is re-verifiable independent of how chunks
/// are later distributed.
pub fn plan(asset: &Path, duration_secs: f64, workers: usize) -> Result<Vec<Chunk>> {
    if workers == 0 {
        return Err(Error::invalid_input("worker count must be positive"));
    }
    if !(duration_secs > 0.0) {
        return Err(Error::invalid_input(format!(
            "asset duration must be positive, got {}",
            duration_secs
        )));
    }

    let chunk_duration = duration_secs / workers as f64;
    let mut chunks = Vec::with_capacity(workers);
    for i in 0..workers {
        let start_secs = i as f64 * chunk_duration;
        let end_secs = ((i + 1) as f64 * chunk_duration).min(duration_secs);
        chunks.push(Chunk {
            chunk_id: i,
            start_secs,
            end_secs,
            asset: asset.to_path_buf(),
        });
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn asset() -> PathBuf {
        PathBuf::from("/video.mp4")
    }

    #[test]
    fn three_workers_split_180s_evenly() {
        let chunks = plan(&asset(), 180.0, 3).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks
                .iter()
                .map(|c| (c.chunk_id, c.start_secs, c.end_secs))
                .collect::<Vec<_>>(),
            vec![(0, 0.0, 60.0), (1, 60.0, 120.0), (2, 120.0, 180.0)]
        );
    }

    #[test]
    fn chunks_partition_the_asset_exactly() {
        for (duration, workers) in [(180.0, 3), (100.0, 7), (3601.5, 8), (0.5, 2), (1.0, 1)] {
            let chunks = plan(&asset(), duration, workers).unwrap();
            assert_eq!(chunks.len(), workers);
            assert_eq!(chunks[0].start_secs, 0.0);
            assert_eq!(chunks[workers - 1].end_secs, duration);
            for pair in chunks.windows(2) {
                // No gap, no overlap.
                assert_eq!(pair[0].end_secs, pair[1].start_secs);
                assert_eq!(pair[1].chunk_id, pair[0].chunk_id + 1);
            }
            for chunk in &chunks {
                assert!(chunk.start_secs < chunk.end_secs);
            }
        }
    }

    #[test]
    fn zero_workers_is_invalid() {
        let err = plan(&asset(), 10.0, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn non_positive_duration_is_invalid() {
        assert!(matches!(
            plan(&asset(), 0.0, 2).unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            plan(&asset(), -3.0, 2).unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            plan(&asset(), f64::NAN, 2).unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[test]
    fn single_worker_gets_the_whole_asset() {
        let chunks = plan(&asset(), 200.0, 1).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_secs, 0.0);
        assert_eq!(chunks[0].end_secs, 200.0);
    }
}
