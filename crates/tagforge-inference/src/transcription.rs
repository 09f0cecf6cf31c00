//! Chunked transcription pipeline and the HTTP transcription backend.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, trace};

use tagforge_core::defaults::{
    AUDIO_CHUNK_SECS, AUDIO_SAMPLE_RATE, INFERENCE_TIMEOUT_SECS, TRANSCRIBE_BASE_URL,
};
use tagforge_core::{AudioDecoder, Error, Result, TranscriptionBackend};

/// Partition decoded samples into contiguous, non-overlapping windows.
///
/// Yields `ceil(len / window)` windows; the last window may be shorter.
pub fn chunk_samples(samples: &[f32], sample_rate: u32, window_secs: u32) -> Vec<&[f32]> {
    let window = sample_rate as usize * window_secs as usize;
    if window == 0 {
        return Vec::new();
    }
    samples.chunks(window).collect()
}

/// Fixed-window transcription over a decoded audio file.
///
/// Windows bound memory and latency per inference call and sidestep model
/// input-length limits; strict sequential ordering keeps transcript word
/// order aligned with playback order. A failure on any window aborts the
/// whole transcription rather than producing a silently partial transcript.
pub struct ChunkedTranscriber {
    decoder: Arc<dyn AudioDecoder>,
    backend: Arc<dyn TranscriptionBackend>,
    sample_rate: u32,
    window_secs: u32,
}

impl ChunkedTranscriber {
    /// Create a pipeline with the default 16 kHz / 30 s windowing.
    pub fn new(decoder: Arc<dyn AudioDecoder>, backend: Arc<dyn TranscriptionBackend>) -> Self {
        Self {
            decoder,
            backend,
            sample_rate: AUDIO_SAMPLE_RATE,
            window_secs: AUDIO_CHUNK_SECS,
        }
    }

    /// Override the window length (tests).
    pub fn with_window_secs(mut self, secs: u32) -> Self {
        self.window_secs = secs;
        self
    }

    /// Transcribe the audio file at `path` to text.
    ///
    /// The unified lifetime keeps the returned future `Send` when awaited
    /// inside boxed trait futures.
    pub async fn transcribe<'a>(&'a self, path: &'a Path) -> Result<String> {
        let samples = self.decoder.decode(path, self.sample_rate).await?;
        let chunks = chunk_samples(&samples, self.sample_rate, self.window_secs);
        debug!(
            path = %path.display(),
            chunk_count = chunks.len(),
            total_secs = samples.len() as f64 / self.sample_rate as f64,
            "Transcribing audio in windows"
        );

        let mut parts = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            let text = self
                .backend
                .transcribe_window(chunk, self.sample_rate)
                .await
                .map_err(|e| {
                    Error::Transcription(format!("window {}/{}: {}", idx + 1, chunks.len(), e))
                })?;
            trace!(window = idx + 1, windows = chunks.len(), "Transcribed window");
            parts.push(text);
        }

        Ok(parts.join(" ").trim().to_string())
    }
}

/// HTTP transcription backend speaking to a Whisper-style service.
///
/// Sends one window of raw little-endian f32 PCM per request.
pub struct HttpTranscriptionBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpTranscriptionBackend {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
            timeout_secs: INFERENCE_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables (with defaults).
    pub fn from_env() -> Self {
        let base_url = std::env::var(tagforge_core::defaults::ENV_TRANSCRIBE_BASE_URL)
            .unwrap_or_else(|_| TRANSCRIBE_BASE_URL.to_string());
        let model = std::env::var("TRANSCRIBE_MODEL").unwrap_or_else(|_| "whisper-1".to_string());
        Self::new(base_url, model)
    }
}

#[derive(Deserialize)]
struct TranscribeResponse {
    text: String,
}

#[async_trait]
impl TranscriptionBackend for HttpTranscriptionBackend {
    async fn transcribe_window(&self, samples: &[f32], sample_rate: u32) -> Result<String> {
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let file_part = reqwest::multipart::Part::bytes(pcm)
            .file_name("window.pcm")
            .mime_str("application/octet-stream")
            .map_err(|e| Error::Internal(format!("Failed to create multipart: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("sample_rate", sample_rate.to_string());

        let url = format!("{}/v1/transcribe", self.base_url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "backend returned {}: {}",
                status, body
            )));
        }

        let result: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("bad response body: {}", e)))?;
        Ok(result.text)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
