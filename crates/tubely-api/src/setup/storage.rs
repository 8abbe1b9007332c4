//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_storage::{create_asset_storage, create_storage, Storage};

/// Build the video storage backend and the local thumbnail store.
pub async fn setup_storage(config: &Config) -> Result<(Arc<dyn Storage>, Arc<dyn Storage>)> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize video storage")?;
    let assets = create_asset_storage(config)
        .await
        .context("Failed to initialize asset storage")?;

    tracing::info!(
        backend = %storage.backend_type(),
        distribution = ?config.s3_cf_distribution(),
        assets_root = %config.assets_root().display(),
        "Storage initialized"
    );

    Ok((storage, assets))
}
