//! # tagforge-worker
//!
//! The broker-coordinated extraction worker: negotiates a module identity,
//! consumes extraction jobs one at a time, dispatches them by content kind
//! to the inference handlers, and publishes deduplicated tag sets.
//!
//! The binary wires these pieces together; the modules here are exposed so
//! integration tests can run the pipeline against mock backends.

pub mod dispatch;
pub mod handlers;
pub mod runner;

pub use dispatch::{supported_extensions, ContentKind};
pub use handlers::HandlerSet;
pub use runner::{JobOutcome, JobRunner, TagsPublisher};
