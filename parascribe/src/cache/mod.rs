//! Best-effort transcript cache.
//!
//! A completed aggregation is cached keyed by (asset, target language) so a
//! resubmission skips recomputation. The cache is never load-bearing: a miss
//! and a backend outage look the same to the coordinator, and store failures
//! are absorbed by the implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use md5::{Digest, Md5};
use tracing::debug;

use crate::coordinator::types::Transcript;

/// Namespaced digest key for one (asset, target language) pair.
pub fn cache_key(asset: &str, target_language: Option<&str>) -> String {
    let mut hasher = Md5::new();
    hasher.update(format!("{}:{}", asset, target_language.unwrap_or("original")).as_bytes());
    format!("transcript:{}", hex::encode(hasher.finalize()))
}

/// Cache boundary for finished transcripts.
#[async_trait]
pub trait TranscriptCache: Send + Sync {
    /// Best-effort probe; outages surface as a miss.
    async fn get(&self, asset: &str, target_language: Option<&str>) -> Option<Transcript>;

    /// Best-effort store; failures are logged, never propagated.
    async fn put(
        &self,
        asset: &str,
        target_language: Option<&str>,
        transcript: &Transcript,
        ttl: Duration,
    );
}

struct CacheEntry {
    transcript: Transcript,
    expires_at: Instant,
}

/// In-memory TTL cache.
pub struct InMemoryTranscriptCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryTranscriptCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl Default for InMemoryTranscriptCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptCache for InMemoryTranscriptCache {
    async fn get(&self, asset: &str, target_language: Option<&str>) -> Option<Transcript> {
        let key = cache_key(asset, target_language);
        let entry = self.entries.get(&key)?;

        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(&key);
            debug!(%key, "cache entry expired");
            return None;
        }

        debug!(%key, "cache hit");
        Some(entry.transcript.clone())
    }

    async fn put(
        &self,
        asset: &str,
        target_language: Option<&str>,
        transcript: &Transcript,
        ttl: Duration,
    ) {
        let key = cache_key(asset, target_language);
        debug!(%key, ttl_secs = ttl.as_secs(), "caching transcript");
        self.entries.insert(
            key,
            CacheEntry {
                transcript: transcript.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(participants_used: usize) -> Transcript {
        Transcript {
            segments: Vec::new(),
            detected_language: "en".to_string(),
            total_segments: 0,
            participants_used,
        }
    }

    #[test]
    fn keys_are_namespaced_digests() {
        let key = cache_key("/video.mp4", Some("es"));
        assert!(key.starts_with("transcript:"));
        // 32 hex chars after the namespace.
        assert_eq!(key.len(), "transcript:".len() + 32);
    }

    #[test]
    fn keys_distinguish_target_language() {
        let original = cache_key("/video.mp4", None);
        let spanish = cache_key("/video.mp4", Some("es"));
        assert_ne!(original, spanish);
        // Stable across calls.
        assert_eq!(original, cache_key("/video.mp4", None));
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = InMemoryTranscriptCache::new();
        cache
            .put("/video.mp4", Some("es"), &transcript(3), Duration::from_secs(60))
            .await;

        let hit = cache.get("/video.mp4", Some("es")).await.unwrap();
        assert_eq!(hit.participants_used, 3);
        // A different language is a miss.
        assert!(cache.get("/video.mp4", Some("de")).await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_read_as_misses() {
        let cache = InMemoryTranscriptCache::new();
        cache
            .put("/video.mp4", None, &transcript(1), Duration::ZERO)
            .await;

        assert!(cache.get("/video.mp4", None).await.is_none());
    }
}
