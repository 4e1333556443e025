//! Attachment storage setup

use anyhow::{Context, Result};
use jotter_core::Config;
use jotter_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize attachment storage")?;

    tracing::info!(
        backend = %storage.backend_type(),
        max_file_size_mb = config.max_file_size_mb(),
        "Attachment storage ready"
    );

    Ok(storage)
}
