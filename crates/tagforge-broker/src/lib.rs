//! # tagforge-broker
//!
//! AMQP coordination layer for tagforge extraction workers:
//! - [`RegistryClient`]: module id negotiation and capability registration
//!   with the meta-manager, over a reply-queue RPC
//! - [`BrokerConsumer`]: the reconnecting job consumer, delivering one job
//!   at a time to a [`JobSink`]
//! - [`ResultPublisher`]: persistent publishing of extracted tags
//!
//! All wire types and queue/exchange names live in `tagforge-core`.

pub mod consumer;
pub mod publisher;
pub mod registry;

pub use consumer::{next_state, BrokerConsumer, ConsumerEvent, ConsumerState, JobSink};
pub use publisher::ResultPublisher;
pub use registry::{resolve_availability, NegotiationOutcome, RegistryClient};
