//! # tagforge-core
//!
//! Core types, traits, and abstractions for the tagforge extraction workers.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other tagforge crates depend on: the shared error type, broker
//! configuration, wire message types, the scoped local-file guard, capability
//! traits for the external ML collaborators, and the tag post-processor.

pub mod config;
pub mod defaults;
pub mod error;
pub mod localfile;
pub mod logging;
pub mod messages;
pub mod tags;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::BrokerConfig;
pub use error::{Error, Result};
pub use localfile::LocalFile;
pub use messages::{
    AvailabilityRequest, AvailabilityResponse, ExtractionJob, ModuleDescriptor, TagsPayload,
};
pub use tags::{dedupe_tags, RawExtraction, TagPostProcessor};
pub use traits::*;
