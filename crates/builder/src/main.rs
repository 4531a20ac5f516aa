//! `shipyard-builder` -- the build executor binary.
//!
//! Runs once per job inside the launched build environment, with the
//! project already checked out in `BUILD_DIR`. Exits 0 when every output
//! file was uploaded and `Done` was published, 1 otherwise.
//!
//! See [`shipyard_builder::config::BuilderConfig::from_env`] for the
//! environment variables.

use std::sync::Arc;

use shipyard_builder::config::BuilderConfig;
use shipyard_builder::BuildExecutor;
use shipyard_cloud::aws::load_sdk_config;
use shipyard_cloud::S3ArtifactStore;
use shipyard_events::RedisBus;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shipyard_builder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BuilderConfig::from_env().unwrap_or_else(|e| {
        tracing::error!("{e}");
        std::process::exit(1);
    });

    tracing::info!(
        job_id = %config.job_id,
        source_url = config.source_url.as_deref().unwrap_or("-"),
        build_dir = %config.build.build_dir.display(),
        output_dir = %config.build.output_dir.display(),
        "Starting shipyard-builder",
    );

    let bus = RedisBus::connect(&config.redis_url)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to connect to the message bus");
            std::process::exit(1);
        });

    let sdk_config = load_sdk_config(&config.aws).await;
    let store = S3ArtifactStore::new(&sdk_config, config.bucket.clone());

    let executor = BuildExecutor::new(
        config.job_id.clone(),
        &config.build,
        Arc::new(bus),
        Arc::new(store),
    );

    match executor.run().await {
        Ok(report) => {
            tracing::info!(uploaded = report.uploaded.len(), "Build finished");
        }
        Err(e) => {
            tracing::error!(error = %e, "Build failed");
            std::process::exit(1);
        }
    }
}
