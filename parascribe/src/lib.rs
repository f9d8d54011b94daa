//! Parascribe: fan-out/fan-in transcription and translation of long media
//! assets.
//!
//! A submitted asset is partitioned into contiguous time chunks, each chunk
//! is dispatched to one participant of an in-process worker group, every
//! participant runs the per-unit pipeline (audio extraction, speech-to-text,
//! optional translation), and the coordinator reassembles the unit results
//! into a single globally time-ordered transcript. Callers poll the job
//! state machine for progress and the final aggregate.

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod media;
pub mod services;

pub use error::{Error, Result};
