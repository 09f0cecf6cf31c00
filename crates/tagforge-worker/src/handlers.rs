//! Content handlers: one extraction routine per [`ContentKind`].
//!
//! Every handler takes a path to the materialized payload and produces a
//! [`RawExtraction`] for post-processing. Handlers never publish and never
//! clean up; both belong to the job runner.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use tagforge_core::defaults::AUDIO_SAMPLE_RATE;
use tagforge_core::{CaptionBackend, DynamicContentBackend, Error, RawExtraction, Result};
use tagforge_inference::{
    extract_audio_track, ChunkedTranscriber, FfmpegAudioDecoder, HttpCaptionBackend,
    HttpTranscriptionBackend, KindTagBackend, PdfOcrPipeline, TesseractOcrBackend,
};

use crate::dispatch::{image_mime_type, ContentKind};

/// Decode file bytes to a string, sniffing the encoding.
///
/// Uploads arrive in whatever encoding the uploader's machine produced. A
/// BOM settles the encoding outright; otherwise the detector guesses from
/// content. Decoding is lossy (replacement characters) rather than failing.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some((encoding, _bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, _, _) = encoding.decode(bytes);
        return text.into_owned();
    }
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// The full set of content handlers a worker runs with.
pub struct HandlerSet {
    caption: Arc<dyn CaptionBackend>,
    transcriber: ChunkedTranscriber,
    ocr: PdfOcrPipeline,
    dynamic: Arc<dyn DynamicContentBackend>,
}

impl HandlerSet {
    pub fn new(
        caption: Arc<dyn CaptionBackend>,
        transcriber: ChunkedTranscriber,
        ocr: PdfOcrPipeline,
        dynamic: Arc<dyn DynamicContentBackend>,
    ) -> Self {
        Self {
            caption,
            transcriber,
            ocr,
            dynamic,
        }
    }

    /// Build the production handler set from environment configuration.
    pub fn from_env() -> Self {
        let decoder = Arc::new(FfmpegAudioDecoder);
        let transcription = Arc::new(HttpTranscriptionBackend::from_env());
        Self::new(
            Arc::new(HttpCaptionBackend::from_env()),
            ChunkedTranscriber::new(decoder, transcription),
            PdfOcrPipeline::new(Arc::new(TesseractOcrBackend::default())),
            Arc::new(KindTagBackend),
        )
    }

    /// Run the handler for `kind` against the materialized payload.
    ///
    /// The unified lifetime keeps the returned future `Send` when awaited
    /// inside boxed trait futures.
    pub async fn extract<'a>(&'a self, kind: ContentKind, path: &'a Path) -> Result<RawExtraction> {
        match kind {
            ContentKind::Image => self.extract_image(path).await,
            ContentKind::Audio => self.extract_audio(path).await,
            ContentKind::Video => self.extract_video(path).await,
            ContentKind::Pdf => self.extract_pdf(path).await,
            ContentKind::Text => self.extract_plain_text(path).await,
        }
    }

    /// Dynamic-content route for flagged PDF jobs: the payload is a small
    /// link file pointing at an external site, and the backend produces
    /// tags directly.
    pub async fn extract_dynamic<'a>(&'a self, path: &'a Path) -> Result<RawExtraction> {
        let bytes = tokio::fs::read(path).await?;
        let content = decode_text(&bytes);
        let tags = self.dynamic.extract(&content).await?;
        Ok(RawExtraction::Tags(tags))
    }

    async fn extract_image<'a>(&'a self, path: &'a Path) -> Result<RawExtraction> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let bytes = tokio::fs::read(path).await?;
        let caption = self.caption.caption(&bytes, image_mime_type(&ext)).await?;
        debug!(caption = %caption, "Captioned image");
        Ok(RawExtraction::Text(caption))
    }

    async fn extract_audio<'a>(&'a self, path: &'a Path) -> Result<RawExtraction> {
        let transcript = self.transcriber.transcribe(path).await?;
        Ok(RawExtraction::Text(transcript))
    }

    /// Video goes through audio extraction first; the track WAV lives in a
    /// temp directory that drops with this call.
    async fn extract_video<'a>(&'a self, path: &'a Path) -> Result<RawExtraction> {
        let track_dir = tempfile::TempDir::new()
            .map_err(|e| Error::Extraction(format!("cannot create audio track dir: {}", e)))?;
        let track = extract_audio_track(path, track_dir.path(), AUDIO_SAMPLE_RATE).await?;
        let transcript = self.transcriber.transcribe(&track).await?;
        Ok(RawExtraction::Text(transcript))
    }

    async fn extract_pdf<'a>(&'a self, path: &'a Path) -> Result<RawExtraction> {
        let text = self.ocr.extract_text(path).await?;
        Ok(RawExtraction::Text(text))
    }

    async fn extract_plain_text<'a>(&'a self, path: &'a Path) -> Result<RawExtraction> {
        let bytes = tokio::fs::read(path).await?;
        Ok(RawExtraction::Text(decode_text(&bytes)))
    }
}
