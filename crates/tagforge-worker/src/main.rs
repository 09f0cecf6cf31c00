//! Worker entrypoint: registration, then consume until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tagforge_broker::{BrokerConsumer, RegistryClient, ResultPublisher};
use tagforge_core::defaults::{ENV_MODULE_ID, ENV_WORK_DIR, MODULE_ID, WORK_DIR};
use tagforge_core::{BrokerConfig, ModuleDescriptor, TagPostProcessor};
use tagforge_inference::HttpKeywordBackend;
use tagforge_worker::{supported_extensions, HandlerSet, JobRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BrokerConfig::from_env();
    let requested_id = std::env::var(ENV_MODULE_ID).unwrap_or_else(|_| MODULE_ID.to_string());
    let work_dir = PathBuf::from(std::env::var(ENV_WORK_DIR).unwrap_or_else(|_| WORK_DIR.to_string()));

    info!(
        broker = %config.display_uri(),
        module_id = %requested_id,
        work_dir = %work_dir.display(),
        "Starting extraction worker"
    );

    // Identity first; without a registered id there is no routing key to
    // consume from, so failure here ends the process with a nonzero exit.
    let registry = RegistryClient::new(config.clone());
    let descriptor = ModuleDescriptor {
        module_id: requested_id,
        supported_extensions: supported_extensions(),
    };
    let module_id = registry
        .negotiate_and_register(&descriptor)
        .await
        .context("module registration failed")?;

    let runner = JobRunner::new(
        work_dir,
        HandlerSet::from_env(),
        TagPostProcessor::new(Arc::new(HttpKeywordBackend::from_env())),
        Arc::new(ResultPublisher::new(config.clone())),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    BrokerConsumer::new(config, module_id)
        .run(&runner, shutdown_rx)
        .await;

    info!("Worker stopped");
    Ok(())
}
