//! PDF page OCR: pdftoppm rendering plus a bounded-parallel OCR fan-out.
//!
//! Pipeline: PDF → pdftoppm (render pages to PNG) → OCR each page →
//! concatenate in page order. Page OCR is the one place the worker uses true
//! parallelism; pages are independent, so the fan-out needs no coordination
//! beyond an order-preserving join.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::process::Command;
use tracing::debug;

use tagforge_core::defaults::EXTRACTION_CMD_TIMEOUT_SECS;
use tagforge_core::{Error, OcrBackend, Result};

use crate::cmd::run_cmd_status;

/// Render PDF pages to PNG files in `out_dir`, returning paths in page order.
pub async fn render_pdf_pages<'a>(
    pdf_path: &'a Path,
    out_dir: &'a Path,
    dpi: u32,
) -> Result<Vec<PathBuf>> {
    let prefix = out_dir.join("page");
    run_cmd_status(
        Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(pdf_path)
            .arg(&prefix),
        EXTRACTION_CMD_TIMEOUT_SECS * 3, // rendering is the slow step
    )
    .await?;

    let mut pages: Vec<PathBuf> = std::fs::read_dir(out_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("png"))
        .collect();
    // pdftoppm zero-pads page numbers, so lexicographic order is page order
    pages.sort();
    Ok(pages)
}

/// Tesseract-backed implementation of [`OcrBackend`].
pub struct TesseractOcrBackend {
    language: String,
}

impl TesseractOcrBackend {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl Default for TesseractOcrBackend {
    fn default() -> Self {
        Self::new("eng")
    }
}

#[async_trait]
impl OcrBackend for TesseractOcrBackend {
    async fn recognize(&self, image_path: &Path) -> Result<String> {
        // tesseract INPUT OUTPUT -l LANG writes OUTPUT.txt
        let output_base = image_path.with_extension("ocr");
        let output_path = PathBuf::from(format!("{}.txt", output_base.display()));

        run_cmd_status(
            Command::new("tesseract")
                .arg(image_path)
                .arg(&output_base)
                .arg("-l")
                .arg(&self.language),
            EXTRACTION_CMD_TIMEOUT_SECS,
        )
        .await?;

        let text = tokio::fs::read_to_string(&output_path)
            .await
            .map_err(|e| Error::Extraction(format!("missing OCR output: {}", e)))?;
        let _ = tokio::fs::remove_file(&output_path).await;
        Ok(text)
    }

    async fn health_check(&self) -> Result<bool> {
        match Command::new("tesseract").arg("--version").output().await {
            Ok(output) => Ok(output.status.success()),
            Err(_) => Ok(false),
        }
    }
}

/// Renders a PDF and OCRs its pages with bounded parallelism.
pub struct PdfOcrPipeline {
    ocr: Arc<dyn OcrBackend>,
    dpi: u32,
    max_parallel: usize,
}

impl PdfOcrPipeline {
    /// Create a pipeline bounded by available hardware concurrency.
    pub fn new(ocr: Arc<dyn OcrBackend>) -> Self {
        let max_parallel = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            ocr,
            dpi: 300,
            max_parallel,
        }
    }

    /// Override the parallelism bound (tests).
    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.max_parallel = max.max(1);
        self
    }

    /// Extract text from a PDF file.
    ///
    /// Returns page texts joined with newlines, in page order regardless of
    /// OCR completion order. Any page failure fails the whole extraction.
    pub async fn extract_text<'a>(&'a self, pdf_path: &'a Path) -> Result<String> {
        let page_dir = tempfile::TempDir::new()
            .map_err(|e| Error::Internal(format!("Failed to create temp dir: {}", e)))?;

        let pages = render_pdf_pages(pdf_path, page_dir.path(), self.dpi).await?;
        if pages.is_empty() {
            debug!(pdf = %pdf_path.display(), "No pages rendered from PDF");
            return Ok(String::new());
        }
        debug!(pdf = %pdf_path.display(), page_count = pages.len(), "OCRing rendered pages");

        // buffered() polls up to max_parallel futures concurrently and yields
        // results in input order, which gives the ordered join for free. Each
        // future owns its page path and backend handle, keeping the stream
        // `Send` across await points.
        let page_texts: Vec<String> = stream::iter(pages.into_iter())
            .map(|page| {
                let ocr = Arc::clone(&self.ocr);
                async move { ocr.recognize(&page).await }
            })
            .buffered(self.max_parallel)
            .try_collect()
            .await?;

        Ok(page_texts.join("\n"))
    }
}
