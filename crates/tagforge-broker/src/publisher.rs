//! Result publishing to the durable tags queue.
//!
//! Results go straight to a durable queue rather than through the extraction
//! exchange, and every message is marked persistent so a broker restart does
//! not drop extracted tags that were never consumed.

use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Connection, ConnectionProperties};
use tracing::{info, warn};

use tagforge_core::defaults::RESULTS_QUEUE;
use tagforge_core::{BrokerConfig, Result, TagsPayload};

/// Persistent message (survives broker restarts on durable queues).
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// Publishes extraction results, one connection per publish.
///
/// Workers publish at most one result per job, so connection reuse buys
/// nothing and a fresh connection avoids holding broker state across the
/// long extraction phase.
pub struct ResultPublisher {
    config: BrokerConfig,
}

impl ResultPublisher {
    pub fn new(config: BrokerConfig) -> Self {
        Self { config }
    }

    /// Publish one tags payload to the results queue.
    pub async fn publish_tags(&self, payload: &TagsPayload) -> Result<()> {
        let conn =
            Connection::connect(&self.config.amqp_uri(), ConnectionProperties::default()).await?;

        let result = self.publish_on(&conn, payload).await;

        if let Err(e) = conn.close(200, "publish done").await {
            warn!(subsystem = "publisher", error = %e, "Error closing publisher connection");
        }

        result
    }

    async fn publish_on(&self, conn: &Connection, payload: &TagsPayload) -> Result<()> {
        let channel = conn.create_channel().await?;
        channel
            .queue_declare(
                RESULTS_QUEUE,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        let body = serde_json::to_vec(payload)?;
        channel
            .basic_publish(
                "",
                RESULTS_QUEUE,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default().with_delivery_mode(DELIVERY_MODE_PERSISTENT),
            )
            .await?
            .await?;

        info!(
            subsystem = "publisher",
            status_id = payload.processed_resource_id,
            tag_count = payload.tags.len(),
            "Published extraction result"
        );
        Ok(())
    }
}
