//! HTTP clients for the transcription and translation services.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{RawSegment, RawTranscript, SpeechToText, Translator};
use crate::{Error, Result};

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::engine(format!("failed to build HTTP client: {}", e)))
}

/// Response shape of a whisper-style `POST /transcribe` endpoint.
#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    language: Option<String>,
    #[serde(default)]
    segments: Vec<TranscribeSegment>,
}

#[derive(Debug, Deserialize)]
struct TranscribeSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Client for a whisper-style speech-to-text HTTP service.
pub struct HttpSpeechToText {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSpeechToText {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl SpeechToText for HttpSpeechToText {
    async fn transcribe(&self, audio: &Path) -> Result<RawTranscript> {
        let bytes = tokio::fs::read(audio).await?;
        let url = format!("{}/transcribe", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .query(&[("output", "json")])
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::engine(format!("transcription request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::engine(format!(
                "transcription service returned {}",
                response.status()
            )));
        }

        let body: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| Error::engine(format!("invalid transcription response: {}", e)))?;

        Ok(RawTranscript {
            language: body.language.unwrap_or_else(|| "unknown".to_string()),
            segments: body
                .segments
                .into_iter()
                .map(|s| RawSegment {
                    start_secs: s.start,
                    end_secs: s.end,
                    text: s.text.trim().to_string(),
                })
                .collect(),
        })
    }
}

/// Response shape of a LibreTranslate-style `POST /translate` endpoint.
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Client for a LibreTranslate-style translation HTTP service.
pub struct HttpTranslator {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTranslator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let url = format!("{}/translate", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "q": text,
                "source": "auto",
                "target": target_language,
                "format": "text",
            }))
            .send()
            .await
            .map_err(|e| Error::engine(format!("translation request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::engine(format!(
                "translation service returned {}",
                response.status()
            )));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| Error::engine(format!("invalid translation response: {}", e)))?;

        Ok(body.translated_text)
    }
}
