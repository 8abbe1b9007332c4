//! Application setup and initialization
//!
//! Everything `main` needs to turn a `Config` into a running router.

pub mod database;
pub mod media;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::PgVideoRepository;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let (storage, assets) = storage::setup_storage(&config).await?;
    let pipeline = media::setup_pipeline(&config).await?;

    let state = Arc::new(AppState {
        config: config.clone(),
        videos: Arc::new(PgVideoRepository::new(pool)),
        storage,
        assets,
        pipeline,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
