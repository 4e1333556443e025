//! Storage abstraction trait
//!
//! This module defines the Storage trait that all attachment backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use jotter_core::models::AttachmentPayload;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Cannot store empty file")]
    EmptyFile,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Attachment storage abstraction
///
/// The note service stores, reads and removes attachments only through this
/// trait, so the external-file and inline variants are interchangeable.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist `data` and return the payload to record on the note.
    async fn put(
        &self,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<AttachmentPayload>;

    /// Read the bytes behind a payload.
    async fn get(&self, payload: &AttachmentPayload) -> StorageResult<Vec<u8>>;

    /// Remove the bytes behind a payload. Deleting something already gone is not an error.
    async fn delete(&self, payload: &AttachmentPayload) -> StorageResult<()>;

    /// Check whether the bytes behind a payload are present.
    async fn exists(&self, payload: &AttachmentPayload) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
