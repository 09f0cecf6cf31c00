//! Structured logging field name constants for tagforge.
//!
//! All crates use these constants for consistent structured logging fields so
//! log aggregation tools can query by standardized names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), job completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration (chunks, OCR pages) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Negotiated module identity of this worker.
pub const MODULE_ID: &str = "module_id";

/// Subsystem originating the log event.
/// Values: "broker", "registry", "runner", "inference"
pub const SUBSYSTEM: &str = "subsystem";

// ─── Job fields ────────────────────────────────────────────────────────────

/// Upstream resource id the job reports back against.
pub const STATUS_ID: &str = "status_id";

/// File name of the job payload.
pub const FILE_NAME: &str = "file_name";

/// Content kind the dispatcher selected.
pub const CONTENT_KIND: &str = "content_kind";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of transcription windows processed.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Number of OCR pages processed.
pub const PAGE_COUNT: &str = "page_count";

/// Number of tags published.
pub const TAG_COUNT: &str = "tag_count";

// ─── Broker fields ─────────────────────────────────────────────────────────

/// Consumer state machine state.
pub const CONSUMER_STATE: &str = "state";

/// Routing key a queue was bound to.
pub const ROUTING_KEY: &str = "routing_key";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
