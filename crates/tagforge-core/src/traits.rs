//! Capability traits at the seams between the coordination layer and the
//! opaque ML collaborators.
//!
//! Every external capability follows the same narrow contract: given bytes or
//! text, return a string or list of strings. Implementations live in
//! `tagforge-inference`; the worker only ever holds `Arc<dyn …>`.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Backend producing a one-line caption for an image.
#[async_trait]
pub trait CaptionBackend: Send + Sync {
    /// Caption raw image bytes.
    async fn caption(&self, image_data: &[u8], mime_type: &str) -> Result<String>;

    /// Check if the captioning backend is available.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend transcribing one window of decoded audio samples.
///
/// Callers hand over mono samples at a fixed rate; windowing is the caller's
/// concern (see the chunked transcription pipeline).
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Transcribe one window of mono f32 samples.
    async fn transcribe_window(&self, samples: &[f32], sample_rate: u32) -> Result<String>;

    /// Check if the transcription backend is available.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Decoder turning an on-disk media file into mono samples.
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    /// Decode the file at `path` to mono f32 samples at `sample_rate` Hz.
    async fn decode(&self, path: &Path, sample_rate: u32) -> Result<Vec<f32>>;
}

/// Backend recognizing text in one rendered page image.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Recognize text in a page image file.
    async fn recognize(&self, image_path: &Path) -> Result<String>;

    /// Check if the OCR backend is available.
    async fn health_check(&self) -> Result<bool>;
}

/// Backend ranking key phrases in a block of text.
#[async_trait]
pub trait KeywordBackend: Send + Sync {
    /// Return ranked phrases, best first. May return more than callers keep.
    async fn rank(&self, text: &str) -> Result<Vec<String>>;

    /// Check if the keyword backend is available.
    async fn health_check(&self) -> Result<bool>;
}

/// Backend handling dynamic-content payloads (link files pointing at
/// external sites). The scraping heuristics behind it are out of scope for
/// this crate; the default implementation tags by classified kind only.
#[async_trait]
pub trait DynamicContentBackend: Send + Sync {
    /// Produce tags for the text content of a dynamic payload.
    async fn extract(&self, content: &str) -> Result<Vec<String>>;
}
