//! Centralized default constants for the tagforge system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers. Organized by domain area.

// =============================================================================
// BROKER
// =============================================================================

/// Default broker host.
pub const RABBIT_HOST: &str = "127.0.0.1";

/// Default broker AMQP port.
pub const RABBIT_PORT: u16 = 5672;

/// Default broker virtual host.
pub const RABBIT_VHOST: &str = "/";

/// Default broker username.
pub const RABBIT_USER: &str = "tagforge";

/// Default broker password.
pub const RABBIT_PASS: &str = "tagforge";

/// Heartbeat interval negotiated with the broker, in seconds.
pub const BROKER_HEARTBEAT_SECS: u64 = 60;

/// Fixed delay before retrying a failed initial connection, in seconds.
pub const BROKER_RECONNECT_DELAY_SECS: u64 = 5;

// =============================================================================
// ROUTING
// =============================================================================

/// Direct exchange coordinating job distribution and registration.
pub const EXTRACTION_EXCHANGE: &str = "meta_extraction";

/// Routing key prefix for per-worker job delivery (`extract.<module_id>`).
pub const EXTRACT_KEY_PREFIX: &str = "extract.";

/// Routing key for module registration messages.
pub const REGISTER_KEY: &str = "register";

/// Routing key for module-id availability checks.
pub const CHECK_AVAILABILITY_KEY: &str = "check_availability";

/// Durable queue receiving extraction results.
pub const RESULTS_QUEUE: &str = "meta_tags_results";

// =============================================================================
// REGISTRATION
// =============================================================================

/// How long to wait for an availability-RPC response before aborting, seconds.
pub const AVAILABILITY_TIMEOUT_SECS: u64 = 5;

/// Default module identity requested at startup.
pub const MODULE_ID: &str = "meta_generator_1";

// =============================================================================
// EXTRACTION
// =============================================================================

/// Maximum number of ranked phrases kept as tags.
pub const TAG_TOP_K: usize = 5;

/// Sample rate audio is decoded to before transcription, in Hz.
pub const AUDIO_SAMPLE_RATE: u32 = 16_000;

/// Transcription window length in seconds.
pub const AUDIO_CHUNK_SECS: u32 = 30;

/// Timeout for external extraction commands (ffmpeg, pdftoppm, tesseract).
pub const EXTRACTION_CMD_TIMEOUT_SECS: u64 = 120;

/// Default directory where job payloads are materialized.
pub const WORK_DIR: &str = "uploads";

// =============================================================================
// INFERENCE
// =============================================================================

/// Default base URL for the captioning backend.
pub const CAPTION_BASE_URL: &str = "http://127.0.0.1:8601";

/// Default base URL for the transcription backend.
pub const TRANSCRIBE_BASE_URL: &str = "http://127.0.0.1:8602";

/// Default base URL for the keyword-ranking backend.
pub const KEYWORD_BASE_URL: &str = "http://127.0.0.1:8603";

/// Timeout for a single inference call, in seconds.
pub const INFERENCE_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// ENVIRONMENT VARIABLE NAMES
// =============================================================================

pub const ENV_RABBIT_HOST: &str = "RABBIT_HOST";
pub const ENV_RABBIT_PORT: &str = "RABBIT_PORT";
pub const ENV_RABBIT_USER: &str = "RABBIT_USER";
pub const ENV_RABBIT_PASS: &str = "RABBIT_PASS";
pub const ENV_RABBIT_VHOST: &str = "RABBIT_VHOST";
pub const ENV_MODULE_ID: &str = "TAGFORGE_MODULE_ID";
pub const ENV_WORK_DIR: &str = "TAGFORGE_WORK_DIR";
pub const ENV_CAPTION_BASE_URL: &str = "CAPTION_BASE_URL";
pub const ENV_TRANSCRIBE_BASE_URL: &str = "TRANSCRIBE_BASE_URL";
pub const ENV_KEYWORD_BASE_URL: &str = "KEYWORD_BASE_URL";
