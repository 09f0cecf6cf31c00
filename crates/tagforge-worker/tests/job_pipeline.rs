//! End-to-end job pipeline tests against mock backends and an in-memory
//! result sink: raw delivery bytes in, published payloads (or nothing) out.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;

use tagforge_broker::JobSink;
use tagforge_core::{Result, TagPostProcessor, TagsPayload};
use tagforge_inference::mock::{
    MockAudioDecoder, MockCaptionBackend, MockKeywordBackend, MockOcrBackend,
    MockTranscriptionBackend,
};
use tagforge_inference::{ChunkedTranscriber, KindTagBackend, PdfOcrPipeline};
use tagforge_worker::{HandlerSet, JobRunner};

/// Publisher capturing payloads instead of touching a broker.
#[derive(Default)]
struct CapturingPublisher {
    published: Mutex<Vec<TagsPayload>>,
}

impl CapturingPublisher {
    fn published(&self) -> Vec<TagsPayload> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl tagforge_worker::TagsPublisher for CapturingPublisher {
    async fn publish(&self, payload: &TagsPayload) -> Result<()> {
        self.published.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

fn temp_work_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tagforge-pipeline-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn b64(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

fn handler_set(ranked: Vec<&str>) -> (HandlerSet, TagPostProcessor) {
    let handlers = HandlerSet::new(
        Arc::new(MockCaptionBackend::new("a dog on a beach")),
        ChunkedTranscriber::new(
            Arc::new(MockAudioDecoder::new(vec![0.0; 16_000])),
            Arc::new(MockTranscriptionBackend::numbered()),
        ),
        PdfOcrPipeline::new(Arc::new(MockOcrBackend::by_stem())),
        Arc::new(KindTagBackend),
    );
    let post = TagPostProcessor::new(Arc::new(MockKeywordBackend::new(
        ranked.iter().map(|s| s.to_string()).collect(),
    )));
    (handlers, post)
}

fn runner(work_dir: PathBuf, ranked: Vec<&str>) -> (JobRunner, Arc<CapturingPublisher>) {
    let publisher = Arc::new(CapturingPublisher::default());
    let (handlers, post) = handler_set(ranked);
    let runner = JobRunner::new(work_dir, handlers, post, publisher.clone());
    (runner, publisher)
}

#[tokio::test]
async fn test_text_job_publishes_capped_unique_tags() {
    let work_dir = temp_work_dir("text");
    let (runner, publisher) = runner(
        work_dir.clone(),
        vec!["alpha", "beta", "alpha", "gamma", "delta", "epsilon", "zeta"],
    );

    let payload = serde_json::json!({
        "filename": "notes/report.txt",
        "filedata": b64(b"quarterly results and projections"),
        "status_id": 7,
    });
    runner.handle(&serde_json::to_vec(&payload).unwrap()).await;

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].processed_resource_id, 7);
    assert!(published[0].tags.len() <= 5);
    let unique: std::collections::HashSet<_> = published[0].tags.iter().collect();
    assert_eq!(unique.len(), published[0].tags.len());

    // basename only, and gone after the job
    assert!(!work_dir.join("report.txt").exists());
    let _ = std::fs::remove_dir_all(&work_dir);
}

#[tokio::test]
async fn test_unsupported_extension_publishes_nothing() {
    let work_dir = temp_work_dir("unsupported");
    let (runner, publisher) = runner(work_dir.clone(), vec!["unused"]);

    let payload = serde_json::json!({
        "filename": "archive.xyz",
        "filedata": b64(b"opaque bytes"),
        "status_id": 3,
    });
    runner.handle(&serde_json::to_vec(&payload).unwrap()).await;

    assert!(publisher.published().is_empty());
    assert!(!work_dir.join("archive.xyz").exists());
    let _ = std::fs::remove_dir_all(&work_dir);
}

#[tokio::test]
async fn test_malformed_job_rejected_before_filesystem_work() {
    let work_dir = temp_work_dir("malformed");
    let (runner, publisher) = runner(work_dir.clone(), vec!["unused"]);

    // missing filedata and status_id
    runner.handle(br#"{"filename":"a.txt"}"#).await;
    runner.handle(b"not json at all").await;

    assert!(publisher.published().is_empty());
    // parse failures never create the working directory
    assert!(!work_dir.exists());
}

#[tokio::test]
async fn test_image_job_ranks_caption() {
    let work_dir = temp_work_dir("image");
    let (runner, publisher) = runner(work_dir.clone(), vec!["dog", "beach"]);

    let payload = serde_json::json!({
        "filename": "photo.JPG",
        "filedata": b64(&[0xff, 0xd8, 0xff, 0xe0]),
        "status_id": 11,
    });
    runner.handle(&serde_json::to_vec(&payload).unwrap()).await;

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    let tags: std::collections::HashSet<_> =
        published[0].tags.iter().map(String::as_str).collect();
    assert_eq!(tags, ["dog", "beach"].into_iter().collect());
    let _ = std::fs::remove_dir_all(&work_dir);
}

#[tokio::test]
async fn test_audio_job_transcribes_and_ranks() {
    let work_dir = temp_work_dir("audio");
    let (runner, publisher) = runner(work_dir.clone(), vec!["spoken phrase"]);

    let payload = serde_json::json!({
        "filename": "memo.mp3",
        "filedata": b64(b"fake mp3 bytes"),
        "status_id": 21,
    });
    runner.handle(&serde_json::to_vec(&payload).unwrap()).await;

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].tags, vec!["spoken phrase"]);
    assert_eq!(published[0].processed_resource_id, 21);
    let _ = std::fs::remove_dir_all(&work_dir);
}

#[tokio::test]
async fn test_handler_failure_publishes_nothing_and_cleans_up() {
    let work_dir = temp_work_dir("failure");
    let publisher = Arc::new(CapturingPublisher::default());
    let handlers = HandlerSet::new(
        Arc::new(MockCaptionBackend::new("unused")),
        ChunkedTranscriber::new(
            Arc::new(MockAudioDecoder::new(vec![0.0; 16_000])),
            Arc::new(MockTranscriptionBackend::failing_at(1)),
        ),
        PdfOcrPipeline::new(Arc::new(MockOcrBackend::by_stem())),
        Arc::new(KindTagBackend),
    );
    let post = TagPostProcessor::new(Arc::new(MockKeywordBackend::new(vec![])));
    let runner = JobRunner::new(work_dir.clone(), handlers, post, publisher.clone());

    let payload = serde_json::json!({
        "filename": "broken.wav",
        "filedata": b64(b"fake wav bytes"),
        "status_id": 5,
    });
    runner.handle(&serde_json::to_vec(&payload).unwrap()).await;

    assert!(publisher.published().is_empty());
    assert!(!work_dir.join("broken.wav").exists());
    let _ = std::fs::remove_dir_all(&work_dir);
}

#[tokio::test]
async fn test_dynamic_pdf_job_tags_by_classified_kind() {
    let work_dir = temp_work_dir("dynamic");
    // Keyword backend would fail the test if consulted: dynamic tags skip
    // ranking entirely.
    let (runner, publisher) = runner(work_dir.clone(), vec!["should-not-appear"]);

    let payload = serde_json::json!({
        "filename": "link.pdf",
        "filedata": b64(b"https://www.youtube.com/watch?v=abc123def45"),
        "status_id": 13,
        "is_dynamic": true,
    });
    runner.handle(&serde_json::to_vec(&payload).unwrap()).await;

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].tags, vec!["youtube"]);
    let _ = std::fs::remove_dir_all(&work_dir);
}

#[tokio::test]
async fn test_dynamic_flag_does_not_rescue_unsupported_extension() {
    let work_dir = temp_work_dir("dynamic-unsupported");
    let (runner, publisher) = runner(work_dir.clone(), vec!["should-not-appear"]);

    let payload = serde_json::json!({
        "filename": "link.xyz",
        "filedata": b64(b"https://www.youtube.com/watch?v=abc123def45"),
        "status_id": 99,
        "is_dynamic": true,
    });
    runner.handle(&serde_json::to_vec(&payload).unwrap()).await;

    assert!(publisher.published().is_empty());
    assert!(!work_dir.join("link.xyz").exists());
    let _ = std::fs::remove_dir_all(&work_dir);
}

#[tokio::test]
async fn test_dynamic_flag_ignored_for_text_jobs() {
    let work_dir = temp_work_dir("dynamic-text");
    // A flagged .txt goes through the normal text handler, so the ranked
    // phrases come back, not the classified site kind.
    let (runner, publisher) = runner(work_dir.clone(), vec!["ranked phrase"]);

    let payload = serde_json::json!({
        "filename": "link.txt",
        "filedata": b64(b"https://www.youtube.com/watch?v=abc123def45"),
        "status_id": 17,
        "is_dynamic": true,
    });
    runner.handle(&serde_json::to_vec(&payload).unwrap()).await;

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].tags, vec!["ranked phrase"]);
    let _ = std::fs::remove_dir_all(&work_dir);
}

#[tokio::test]
async fn test_empty_text_job_publishes_empty_tag_set() {
    let work_dir = temp_work_dir("empty");
    let (runner, publisher) = runner(work_dir.clone(), vec!["should-not-appear"]);

    let payload = serde_json::json!({
        "filename": "blank.txt",
        "filedata": b64(b"   \n\t "),
        "status_id": 9,
    });
    runner.handle(&serde_json::to_vec(&payload).unwrap()).await;

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert!(published[0].tags.is_empty());
    assert_eq!(published[0].processed_resource_id, 9);
    let _ = std::fs::remove_dir_all(&work_dir);
}
