//! Unit execution: the per-chunk media pipeline.

use std::sync::Arc;

use tracing::{debug, warn};

use super::types::{Chunk, Segment, UnitResult};
use crate::Result;
use crate::engine::{SpeechToText, Translator};
use crate::media::SegmentExtractor;

/// Identity of one unit execution within a job.
#[derive(Debug, Clone)]
pub struct UnitContext {
    pub job_id: String,
    /// Index of the participant running this unit.
    pub participant: usize,
    pub target_language: Option<String>,
}

/// Runs the per-unit pipeline: extract the chunk's audio into a scoped
/// workspace, transcribe it, optionally translate each segment, and rebase
/// timestamps to absolute asset time.
pub struct UnitExecutor {
    extractor: Arc<dyn SegmentExtractor>,
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
}

impl UnitExecutor {
    pub fn new(
        extractor: Arc<dyn SegmentExtractor>,
        stt: Arc<dyn SpeechToText>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            extractor,
            stt,
            translator,
        }
    }

    /// Execute the unit pipeline for one chunk.
    ///
    /// Failures are data: the returned [`UnitResult`] carries them, and
    /// nothing raises past the coordinator boundary.
    pub async fn execute(&self, ctx: &UnitContext, chunk: &Chunk) -> UnitResult {
        match self.run(ctx, chunk).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    job_id = %ctx.job_id,
                    chunk_id = chunk.chunk_id,
                    participant = ctx.participant,
                    error = %e,
                    "unit execution failed"
                );
                UnitResult::failed(chunk.chunk_id, e.to_string())
            }
        }
    }

    async fn run(&self, ctx: &UnitContext, chunk: &Chunk) -> Result<UnitResult> {
        // Workspace unique per (job, chunk, participant): the same participant
        // may run chunks of several jobs concurrently. Removed on drop on
        // every exit path.
        let workspace = tempfile::Builder::new()
            .prefix(&format!(
                "unit-{}-c{}-p{}-",
                ctx.job_id, chunk.chunk_id, ctx.participant
            ))
            .tempdir()?;
        let wav_path = workspace.path().join("segment.wav");

        self.extractor
            .extract(&chunk.asset, chunk.start_secs, chunk.end_secs, &wav_path)
            .await?;

        let raw = self.stt.transcribe(&wav_path).await?;

        let mut segments = Vec::with_capacity(raw.segments.len());
        for raw_segment in raw.segments {
            let translated_text = match ctx.target_language.as_deref() {
                Some(target) => Some(match self.translator.translate(&raw_segment.text, target).await
                {
                    Ok(translated) => translated,
                    Err(e) => {
                        // Degraded, not fatal: carry the source text forward.
                        warn!(
                            job_id = %ctx.job_id,
                            chunk_id = chunk.chunk_id,
                            error = %e,
                            "translation failed, keeping source text"
                        );
                        raw_segment.text.clone()
                    }
                }),
                None => None,
            };

            segments.push(Segment {
                start_secs: raw_segment.start_secs + chunk.start_secs,
                end_secs: raw_segment.end_secs + chunk.start_secs,
                text: raw_segment.text,
                translated_text,
            });
        }

        debug!(
            job_id = %ctx.job_id,
            chunk_id = chunk.chunk_id,
            segments = segments.len(),
            language = %raw.language,
            "unit completed"
        );

        Ok(UnitResult::ok(chunk.chunk_id, segments, raw.language))
    }
}
