//! Media toolchain boundary: duration probing and audio segment extraction.

mod extract;
mod probe;

pub use extract::{FfmpegSegmentExtractor, SegmentExtractor};
pub use probe::{DurationProbe, FfprobeDurationProbe};
