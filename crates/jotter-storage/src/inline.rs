use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use jotter_core::models::AttachmentPayload;

/// Inline storage: attachment bytes travel with the note row.
///
/// Nothing is written outside the database, so `delete` has nothing to do;
/// the bytes disappear with the row or with the next replacement.
#[derive(Clone, Debug, Default)]
pub struct InlineStorage;

impl InlineStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Storage for InlineStorage {
    async fn put(
        &self,
        file_name: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<AttachmentPayload> {
        if data.is_empty() {
            return Err(StorageError::EmptyFile);
        }

        tracing::debug!(
            file_name = %file_name,
            size_bytes = data.len(),
            "Attachment kept inline"
        );

        Ok(AttachmentPayload::Inline(data))
    }

    async fn get(&self, payload: &AttachmentPayload) -> StorageResult<Vec<u8>> {
        match payload {
            AttachmentPayload::Inline(data) if data.is_empty() => {
                Err(StorageError::NotFound("inline payload is empty".to_string()))
            }
            AttachmentPayload::Inline(data) => Ok(data.clone()),
            AttachmentPayload::External { storage_key, .. } => Err(StorageError::InvalidKey(
                format!("External key {} cannot be resolved inline", storage_key),
            )),
        }
    }

    async fn delete(&self, _payload: &AttachmentPayload) -> StorageResult<()> {
        Ok(())
    }

    async fn exists(&self, payload: &AttachmentPayload) -> StorageResult<bool> {
        Ok(matches!(payload, AttachmentPayload::Inline(data) if !data.is_empty()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Inline
    }
}
