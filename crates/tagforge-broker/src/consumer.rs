//! Job consumer with automatic reconnection.
//!
//! The consumer owns the worker's lifetime on the broker: declare the
//! extraction exchange, bind an exclusive queue under the worker's routing
//! key, and deliver jobs one at a time to a [`JobSink`]. Any broker failure
//! drops the session and re-enters the connect path after a fixed delay;
//! only an explicit shutdown signal leaves the loop.
//!
//! Deliveries are consumed with `no_ack` and prefetch 1, so a job is removed
//! from the queue the moment the broker hands it over. A crash mid-job loses
//! that job. Changing this means acking after the sink returns, which also
//! changes redelivery behavior for every failure path.

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicConsumeOptions, BasicQosOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, Consumer, ExchangeKind};
use tokio::sync::watch;
use tracing::{error, info, warn};

use tagforge_core::defaults::{EXTRACTION_EXCHANGE, EXTRACT_KEY_PREFIX};
use tagforge_core::{BrokerConfig, Result};

/// Receiver for raw job payloads.
///
/// The sink must not panic and must not return: every job outcome, success
/// or failure, is the sink's to handle and log. The consumer keeps going
/// regardless.
#[async_trait]
pub trait JobSink: Send + Sync {
    async fn handle(&self, payload: &[u8]);
}

/// Where the consumer currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Disconnected,
    Connecting,
    Bound,
    Consuming,
    Failed,
}

impl ConsumerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumerState::Disconnected => "disconnected",
            ConsumerState::Connecting => "connecting",
            ConsumerState::Bound => "bound",
            ConsumerState::Consuming => "consuming",
            ConsumerState::Failed => "failed",
        }
    }
}

/// Events that drive the consumer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerEvent {
    Start,
    SessionEstablished,
    ConsumeStarted,
    SessionLost,
    RetryDelayElapsed,
    ShutdownRequested,
}

/// Pure lifecycle transition. Unexpected events leave the state unchanged.
pub fn next_state(state: ConsumerState, event: ConsumerEvent) -> ConsumerState {
    use ConsumerEvent::*;
    use ConsumerState::*;
    match (state, event) {
        (_, ShutdownRequested) => Disconnected,
        (Disconnected, Start) => Connecting,
        (Connecting, SessionEstablished) => Bound,
        (Bound, ConsumeStarted) => Consuming,
        (Connecting | Bound | Consuming, SessionLost) => Failed,
        (Failed, RetryDelayElapsed) => Connecting,
        (s, _) => s,
    }
}

/// Consumes extraction jobs for one registered module id.
pub struct BrokerConsumer {
    config: BrokerConfig,
    module_id: String,
}

impl BrokerConsumer {
    pub fn new(config: BrokerConfig, module_id: impl Into<String>) -> Self {
        Self {
            config,
            module_id: module_id.into(),
        }
    }

    /// Routing key this consumer binds under.
    pub fn routing_key(&self) -> String {
        format!("{}{}", EXTRACT_KEY_PREFIX, self.module_id)
    }

    /// Run until `shutdown` fires. Never returns an error: broker failures
    /// are absorbed by the reconnect loop.
    pub async fn run(&self, sink: &dyn JobSink, mut shutdown: watch::Receiver<bool>) {
        let mut state = next_state(ConsumerState::Disconnected, ConsumerEvent::Start);

        loop {
            if *shutdown.borrow() {
                break;
            }
            info!(
                subsystem = "consumer",
                state = state.as_str(),
                module_id = %self.module_id,
                "Connecting to broker"
            );

            match self.open_session().await {
                Ok((conn, consumer)) => {
                    state = next_state(state, ConsumerEvent::SessionEstablished);
                    state = next_state(state, ConsumerEvent::ConsumeStarted);
                    info!(
                        subsystem = "consumer",
                        state = state.as_str(),
                        routing_key = %self.routing_key(),
                        "Consuming extraction jobs"
                    );

                    let stopped = self.consume(consumer, sink, &mut shutdown).await;
                    if let Err(e) = conn.close(200, "consumer done").await {
                        warn!(subsystem = "consumer", error = %e, "Error closing consumer connection");
                    }
                    if stopped {
                        state = next_state(state, ConsumerEvent::ShutdownRequested);
                        break;
                    }
                    state = next_state(state, ConsumerEvent::SessionLost);
                }
                Err(e) => {
                    state = next_state(state, ConsumerEvent::SessionLost);
                    error!(
                        subsystem = "consumer",
                        state = state.as_str(),
                        error = %e,
                        "Broker session failed"
                    );
                }
            }

            // Fixed delay before the next attempt; shutdown cuts it short.
            let delay = std::time::Duration::from_secs(self.config.reconnect_delay_secs);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    state = next_state(state, ConsumerEvent::RetryDelayElapsed);
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        state = next_state(state, ConsumerEvent::ShutdownRequested);
                        break;
                    }
                }
            }
        }

        info!(
            subsystem = "consumer",
            state = state.as_str(),
            "Consumer stopped"
        );
    }

    /// Establish one broker session: connection, topology, consume stream.
    async fn open_session(&self) -> Result<(Connection, Consumer)> {
        let conn =
            Connection::connect(&self.config.amqp_uri(), ConnectionProperties::default()).await?;
        let channel = conn.create_channel().await?;
        let consumer = self.bind_and_consume(&channel).await?;
        Ok((conn, consumer))
    }

    async fn bind_and_consume(&self, channel: &Channel) -> Result<Consumer> {
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

        // Anonymous exclusive queue; dies with this connection so stale
        // bindings never accumulate across restarts.
        let queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        let queue_name = queue.name().clone();

        channel
            .queue_bind(
                queue_name.as_str(),
                EXTRACTION_EXCHANGE,
                &self.routing_key(),
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;

        // One unprocessed job at a time.
        channel.basic_qos(1, BasicQosOptions::default()).await?;

        let consumer = channel
            .basic_consume(
                queue_name.as_str(),
                &self.module_id,
                BasicConsumeOptions {
                    no_ack: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(consumer)
    }

    /// Drain deliveries until the stream ends or shutdown fires.
    ///
    /// Returns true when shutdown was requested, false when the session was
    /// lost and the caller should reconnect.
    async fn consume(
        &self,
        mut consumer: Consumer,
        sink: &dyn JobSink,
        shutdown: &mut watch::Receiver<bool>,
    ) -> bool {
        loop {
            tokio::select! {
                delivery = consumer.next() => {
                    match delivery {
                        Some(Ok(delivery)) => {
                            sink.handle(&delivery.data).await;
                        }
                        Some(Err(e)) => {
                            error!(subsystem = "consumer", error = %e, "Delivery stream error");
                            return false;
                        }
                        None => {
                            warn!(subsystem = "consumer", "Delivery stream closed by broker");
                            return false;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return true;
                    }
                }
            }
        }
    }
}
