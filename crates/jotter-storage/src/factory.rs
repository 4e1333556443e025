#[cfg(feature = "storage-inline")]
use crate::InlineStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{Storage, StorageBackend, StorageResult};
#[cfg(not(all(feature = "storage-local", feature = "storage-inline")))]
use crate::StorageError;
use jotter_core::Config;
use std::sync::Arc;

/// Create an attachment storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage =
                LocalStorage::new(&config.upload_dir, config.uploads_url_path.clone()).await?;
            tracing::info!(
                upload_dir = %storage.base_path().display(),
                url_path = %config.uploads_url_path,
                "Using local attachment storage"
            );
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-inline")]
        StorageBackend::Inline => {
            tracing::info!("Using inline attachment storage");
            Ok(Arc::new(InlineStorage::new()))
        }

        #[cfg(not(feature = "storage-inline"))]
        StorageBackend::Inline => Err(StorageError::ConfigError(
            "Inline storage backend not available (storage-inline feature not enabled)".to_string(),
        )),
    }
}
