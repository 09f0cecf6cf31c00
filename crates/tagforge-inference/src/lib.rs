//! # tagforge-inference
//!
//! External ML capability backends for tagforge extraction workers.
//!
//! Every capability follows the narrow contract defined in
//! `tagforge-core::traits`: given bytes or text, return a string or list of
//! strings. This crate provides:
//! - HTTP backends for captioning, transcription, and keyword ranking
//! - The chunked transcription pipeline (fixed 30 s windows at 16 kHz)
//! - ffmpeg-based audio decoding and video audio-track extraction
//! - pdftoppm/tesseract page OCR with a bounded-parallel, order-preserving
//!   fan-out
//! - The dynamic-content domain classifier
//! - Mock backends for deterministic tests

pub mod audio;
pub mod caption;
pub mod cmd;
pub mod dynamic;
pub mod keywords;
pub mod mock;
pub mod ocr;
pub mod transcription;

pub use audio::{extract_audio_track, FfmpegAudioDecoder};
pub use caption::HttpCaptionBackend;
pub use dynamic::{classify_dynamic_content, DynamicKind, KindTagBackend};
pub use keywords::HttpKeywordBackend;
pub use ocr::{PdfOcrPipeline, TesseractOcrBackend};
pub use transcription::{chunk_samples, ChunkedTranscriber, HttpTranscriptionBackend};
