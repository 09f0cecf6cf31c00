//! Mock capability backends for deterministic testing.
//!
//! Every mock records its calls so tests can assert on invocation counts and
//! inputs without a live inference service.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tagforge_core::{
    AudioDecoder, CaptionBackend, Error, KeywordBackend, OcrBackend, Result, TranscriptionBackend,
};

/// Caption backend returning a fixed caption.
pub struct MockCaptionBackend {
    caption: String,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl MockCaptionBackend {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Byte lengths of the images captioned so far.
    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaptionBackend for MockCaptionBackend {
    async fn caption(&self, image_data: &[u8], _mime_type: &str) -> Result<String> {
        self.calls.lock().unwrap().push(image_data.len());
        Ok(self.caption.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "mock-caption"
    }
}

/// Transcription backend yielding "window-N" per call, optionally failing at
/// a given window number.
pub struct MockTranscriptionBackend {
    counter: AtomicUsize,
    fail_at: Option<usize>,
}

impl MockTranscriptionBackend {
    /// Number each window: first call yields "window-1", then "window-2", ...
    pub fn numbered() -> Self {
        Self {
            counter: AtomicUsize::new(0),
            fail_at: None,
        }
    }

    /// Fail the nth call (1-based); earlier calls succeed.
    pub fn failing_at(n: usize) -> Self {
        Self {
            counter: AtomicUsize::new(0),
            fail_at: Some(n),
        }
    }
}

#[async_trait]
impl TranscriptionBackend for MockTranscriptionBackend {
    async fn transcribe_window(&self, _samples: &[f32], _sample_rate: u32) -> Result<String> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_at == Some(n) {
            return Err(Error::Inference(format!("mock failure at window {}", n)));
        }
        Ok(format!("window-{}", n))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "mock-whisper"
    }
}

/// Audio decoder returning a fixed sample buffer, ignoring the input path.
pub struct MockAudioDecoder {
    samples: Vec<f32>,
}

impl MockAudioDecoder {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }
}

#[async_trait]
impl AudioDecoder for MockAudioDecoder {
    async fn decode(&self, _path: &Path, _sample_rate: u32) -> Result<Vec<f32>> {
        Ok(self.samples.clone())
    }
}

/// OCR backend deriving text from the image file stem.
pub struct MockOcrBackend {
    fail_stem: Option<String>,
    reverse_latency: bool,
}

impl MockOcrBackend {
    /// Return the file stem as the recognized text.
    pub fn by_stem() -> Self {
        Self {
            fail_stem: None,
            reverse_latency: false,
        }
    }

    /// Fail when recognizing a file whose stem matches.
    pub fn failing_on(stem: impl Into<String>) -> Self {
        Self {
            fail_stem: Some(stem.into()),
            reverse_latency: false,
        }
    }

    /// Make earlier pages slower than later ones, to exercise ordered joins.
    pub fn with_reverse_latency(mut self) -> Self {
        self.reverse_latency = true;
        self
    }
}

#[async_trait]
impl OcrBackend for MockOcrBackend {
    async fn recognize(&self, image_path: &Path) -> Result<String> {
        let stem = image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        if self.fail_stem.as_deref() == Some(stem.as_str()) {
            return Err(Error::Extraction(format!("mock OCR failure on {}", stem)));
        }

        if self.reverse_latency {
            // page-1 sleeps longest so completion order inverts page order
            let rank = stem
                .rsplit('-')
                .next()
                .and_then(|n| n.parse::<u64>().ok())
                .unwrap_or(0);
            let delay = 30u64.saturating_sub(rank * 10);
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }

        Ok(stem)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Keyword backend returning a fixed ranking.
pub struct MockKeywordBackend {
    phrases: Vec<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockKeywordBackend {
    pub fn new(phrases: Vec<String>) -> Self {
        Self {
            phrases,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Texts ranked so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeywordBackend for MockKeywordBackend {
    async fn rank(&self, text: &str) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(self.phrases.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_caption_records_calls() {
        let backend = MockCaptionBackend::new("a cat");
        backend.caption(b"12345", "image/png").await.unwrap();
        backend.caption(b"12", "image/png").await.unwrap();
        assert_eq!(backend.call_sizes(), vec![5, 2]);
    }

    #[tokio::test]
    async fn test_mock_transcription_numbers_windows() {
        let backend = MockTranscriptionBackend::numbered();
        assert_eq!(backend.transcribe_window(&[], 16_000).await.unwrap(), "window-1");
        assert_eq!(backend.transcribe_window(&[], 16_000).await.unwrap(), "window-2");
    }

    #[tokio::test]
    async fn test_mock_transcription_failing_at() {
        let backend = MockTranscriptionBackend::failing_at(2);
        assert!(backend.transcribe_window(&[], 16_000).await.is_ok());
        assert!(backend.transcribe_window(&[], 16_000).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_ocr_by_stem() {
        let backend = MockOcrBackend::by_stem();
        let text = backend.recognize(Path::new("/x/page-7.png")).await.unwrap();
        assert_eq!(text, "page-7");
    }

    #[tokio::test]
    async fn test_mock_keyword_records_text() {
        let backend = MockKeywordBackend::new(vec!["k".to_string()]);
        backend.rank("some text").await.unwrap();
        assert_eq!(backend.calls(), vec!["some text"]);
    }
}
