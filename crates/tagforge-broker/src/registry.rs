//! Module registry client: identity negotiation and registration.
//!
//! The meta-manager answers availability checks over an RPC built atop the
//! broker: the request carries a `reply_to` address naming a single-use
//! exclusive queue, and exactly one response is awaited there for a bounded
//! interval. On success the worker's descriptor is published fire-and-forget
//! so future jobs can be routed to it.

use futures::StreamExt;
use lapin::options::{
    BasicCancelOptions, BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tracing::{info, warn};

use tagforge_core::defaults::{
    AVAILABILITY_TIMEOUT_SECS, CHECK_AVAILABILITY_KEY, EXTRACTION_EXCHANGE, REGISTER_KEY,
};
use tagforge_core::{
    AvailabilityRequest, AvailabilityResponse, BrokerConfig, Error, ModuleDescriptor, Result,
};

/// Bound on identity-negotiation attempts, counting the initial one.
///
/// Each retry uses the id the meta-manager suggested; a well-behaved manager
/// converges on the first suggestion, so hitting the bound means it is
/// suggesting ids it then reports unavailable.
const MAX_NEGOTIATION_ATTEMPTS: usize = 3;

/// Decision derived from one availability round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationOutcome {
    /// The requested id is ours.
    Accept(String),
    /// The requested id is taken; retry with the suggested one.
    RetryWith(String),
    /// Negotiation cannot proceed; registration fails.
    Abort(String),
}

/// Pure negotiation policy over one (possibly missing) RPC response.
pub fn resolve_availability(
    requested_id: &str,
    response: Option<AvailabilityResponse>,
) -> NegotiationOutcome {
    match response {
        None => NegotiationOutcome::Abort(format!(
            "no availability response for '{}' within {}s",
            requested_id, AVAILABILITY_TIMEOUT_SECS
        )),
        Some(resp) if resp.is_available => NegotiationOutcome::Accept(requested_id.to_string()),
        Some(AvailabilityResponse {
            suggested_id: Some(suggested),
            ..
        }) => NegotiationOutcome::RetryWith(suggested),
        Some(_) => NegotiationOutcome::Abort(format!(
            "module id '{}' unavailable and no alternative suggested",
            requested_id
        )),
    }
}

/// Client for the meta-manager's registration protocol.
pub struct RegistryClient {
    config: BrokerConfig,
}

impl RegistryClient {
    pub fn new(config: BrokerConfig) -> Self {
        Self { config }
    }

    /// Negotiate a unique module id and register the worker's capabilities.
    ///
    /// Returns the effective id, which may differ from
    /// `descriptor.module_id` when the meta-manager suggested an alternate.
    /// Failure here is fatal for the process: a worker without a registered
    /// identity has no routing key to consume from.
    pub async fn negotiate_and_register(&self, descriptor: &ModuleDescriptor) -> Result<String> {
        let conn = Connection::connect(&self.config.amqp_uri(), ConnectionProperties::default())
            .await
            .map_err(|e| {
                Error::Registration(format!(
                    "cannot reach broker at {}: {}",
                    self.config.display_uri(),
                    e
                ))
            })?;

        let result = self.negotiate_on(&conn, descriptor).await;

        // Connection teardown runs on every path; close errors only shadow
        // the negotiation result, so they are logged and dropped.
        if let Err(e) = conn.close(200, "registration done").await {
            warn!(subsystem = "registry", error = %e, "Error closing registration connection");
        }

        result
    }

    async fn negotiate_on(
        &self,
        conn: &Connection,
        descriptor: &ModuleDescriptor,
    ) -> Result<String> {
        let channel = conn.create_channel().await?;
        channel
            .exchange_declare(
                EXTRACTION_EXCHANGE,
                ExchangeKind::Direct,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        let mut candidate = descriptor.module_id.clone();
        for attempt in 1..=MAX_NEGOTIATION_ATTEMPTS {
            let response = self.check_availability(&channel, &candidate).await?;
            match resolve_availability(&candidate, response) {
                NegotiationOutcome::Accept(id) => {
                    self.register(&channel, descriptor, &id).await?;
                    info!(
                        subsystem = "registry",
                        module_id = %id,
                        attempt,
                        "Registered module"
                    );
                    return Ok(id);
                }
                NegotiationOutcome::RetryWith(suggested) => {
                    info!(
                        subsystem = "registry",
                        requested = %candidate,
                        suggested = %suggested,
                        "Module id taken, retrying with suggestion"
                    );
                    candidate = suggested;
                }
                NegotiationOutcome::Abort(reason) => return Err(Error::Registration(reason)),
            }
        }

        Err(Error::Registration(format!(
            "no available module id after {} attempts",
            MAX_NEGOTIATION_ATTEMPTS
        )))
    }

    /// One availability round-trip. `None` means the bounded wait elapsed
    /// with no response.
    async fn check_availability(
        &self,
        channel: &Channel,
        module_id: &str,
    ) -> Result<Option<AvailabilityResponse>> {
        // Single-use anonymous reply queue; exclusive so the broker tears it
        // down with this connection.
        let reply_queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        let reply_name = reply_queue.name().clone();

        // Empty tag: the broker generates a fresh consumer tag per attempt,
        // so retries with a suggested id never collide on this channel.
        let mut replies = channel
            .basic_consume(
                reply_name.as_str(),
                "",
                BasicConsumeOptions {
                    no_ack: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        let consumer_tag = replies.tag();

        let request = AvailabilityRequest {
            module_id: module_id.to_string(),
        };
        channel
            .basic_publish(
                EXTRACTION_EXCHANGE,
                CHECK_AVAILABILITY_KEY,
                BasicPublishOptions::default(),
                &serde_json::to_vec(&request)?,
                BasicProperties::default().with_reply_to(reply_name.clone()),
            )
            .await?;

        let wait = std::time::Duration::from_secs(AVAILABILITY_TIMEOUT_SECS);
        let response = match tokio::time::timeout(wait, replies.next()).await {
            Ok(Some(Ok(delivery))) => Some(serde_json::from_slice(&delivery.data)?),
            Ok(Some(Err(e))) => return Err(e.into()),
            Ok(None) => None,
            Err(_elapsed) => None,
        };

        // Tear the reply consumer down before any retry reuses the channel.
        channel
            .basic_cancel(consumer_tag.as_str(), BasicCancelOptions::default())
            .await?;

        Ok(response)
    }

    /// Publish the descriptor under the effective id. Fire-and-forget: no
    /// acknowledgment is awaited, best-effort by design.
    async fn register(
        &self,
        channel: &Channel,
        descriptor: &ModuleDescriptor,
        effective_id: &str,
    ) -> Result<()> {
        let registration = ModuleDescriptor {
            module_id: effective_id.to_string(),
            supported_extensions: descriptor.supported_extensions.clone(),
        };
        channel
            .basic_publish(
                EXTRACTION_EXCHANGE,
                REGISTER_KEY,
                BasicPublishOptions::default(),
                &serde_json::to_vec(&registration)?,
                BasicProperties::default(),
            )
            .await?;
        Ok(())
    }
}
