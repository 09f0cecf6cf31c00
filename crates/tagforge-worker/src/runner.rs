//! The job runner: one delivery in, at most one result out.
//!
//! The runner is the worker's single top-level outcome site. Handlers and
//! the post-processor return errors; only [`JobRunner::handle`] decides what
//! an error means for the process (nothing: log and wait for the next job).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info, warn};

use tagforge_broker::{JobSink, ResultPublisher};
use tagforge_core::{ExtractionJob, LocalFile, Result, TagPostProcessor, TagsPayload};

use crate::dispatch::ContentKind;
use crate::handlers::HandlerSet;

/// Destination for extraction results.
///
/// The broker publisher is the production implementation; tests capture
/// payloads in memory.
#[async_trait]
pub trait TagsPublisher: Send + Sync {
    async fn publish(&self, payload: &TagsPayload) -> Result<()>;
}

#[async_trait]
impl TagsPublisher for ResultPublisher {
    async fn publish(&self, payload: &TagsPayload) -> Result<()> {
        self.publish_tags(payload).await
    }
}

/// What became of one job.
#[derive(Debug, PartialEq, Eq)]
pub enum JobOutcome {
    Published { status_id: i64, tag_count: usize },
    SkippedUnsupported { file_name: String },
}

/// Runs the full per-job pipeline: parse, materialize, extract,
/// post-process, publish, clean up.
pub struct JobRunner {
    work_dir: PathBuf,
    handlers: HandlerSet,
    post: TagPostProcessor,
    publisher: Arc<dyn TagsPublisher>,
}

impl JobRunner {
    pub fn new(
        work_dir: PathBuf,
        handlers: HandlerSet,
        post: TagPostProcessor,
        publisher: Arc<dyn TagsPublisher>,
    ) -> Self {
        Self {
            work_dir,
            handlers,
            post,
            publisher,
        }
    }

    /// Process one raw delivery.
    ///
    /// Parsing runs before anything touches the filesystem; from
    /// materialization on, the payload file is removed on every exit path
    /// by the [`LocalFile`] guard.
    async fn run_job<'a>(&'a self, payload: &'a [u8]) -> Result<JobOutcome> {
        let job = ExtractionJob::parse(payload)?;
        let file_name = job.file_name().to_string();

        let local = LocalFile::materialize(&self.work_dir, &file_name, &job.filedata)?;

        let kind = job
            .extension()
            .and_then(|ext| ContentKind::from_extension(&ext));
        // The dynamic flag only reroutes PDF jobs; everything else dispatches
        // by extension alone, and unsupported extensions are skipped outright.
        let raw = match kind {
            Some(ContentKind::Pdf) if job.is_dynamic => {
                info!(
                    subsystem = "runner",
                    file_name = %file_name,
                    content_kind = "dynamic",
                    status_id = job.status_id,
                    "Dispatching job"
                );
                self.handlers.extract_dynamic(local.path()).await?
            }
            Some(kind) => {
                info!(
                    subsystem = "runner",
                    file_name = %file_name,
                    content_kind = kind.as_str(),
                    status_id = job.status_id,
                    "Dispatching job"
                );
                self.handlers.extract(kind, local.path()).await?
            }
            None => return Ok(JobOutcome::SkippedUnsupported { file_name }),
        };

        let tags = self.post.process(raw).await?;
        let result = TagsPayload {
            tags,
            processed_resource_id: job.status_id,
        };
        self.publisher.publish(&result).await?;

        Ok(JobOutcome::Published {
            status_id: job.status_id,
            tag_count: result.tags.len(),
        })
    }
}

#[async_trait]
impl JobSink for JobRunner {
    async fn handle(&self, payload: &[u8]) {
        let started = Instant::now();
        match self.run_job(payload).await {
            Ok(JobOutcome::Published {
                status_id,
                tag_count,
            }) => {
                info!(
                    subsystem = "runner",
                    status_id,
                    tag_count,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Job completed"
                );
            }
            Ok(JobOutcome::SkippedUnsupported { file_name }) => {
                warn!(
                    subsystem = "runner",
                    file_name = %file_name,
                    "Unsupported file type, job skipped"
                );
            }
            Err(e) => {
                error!(
                    subsystem = "runner",
                    error = %e,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Job failed"
                );
            }
        }
    }
}
