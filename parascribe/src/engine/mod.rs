//! External capability boundaries: speech-to-text and translation.
//!
//! Both capabilities are opaque providers behind async traits; the service
//! ships HTTP clients for them and tests substitute fakes.

use std::path::Path;

use async_trait::async_trait;

use crate::Result;

mod http;

pub use http::{HttpSpeechToText, HttpTranslator};

/// One transcription segment in chunk-local time.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

/// Output of one transcription call.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTranscript {
    /// Language detected by the transcription engine.
    pub language: String,
    /// Segments in the order the engine produced them.
    pub segments: Vec<RawSegment>,
}

/// Speech-to-text capability.
///
/// Failures surface as a single error, never partial output.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<RawTranscript>;
}

/// Text translation capability.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}
