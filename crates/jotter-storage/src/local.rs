use crate::keys::generate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use jotter_core::models::AttachmentPayload;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Everything except RFC 3986 unreserved characters is escaped in the URL segment.
const URL_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Local filesystem storage implementation (external-file variant)
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating the upload directory if absent.
    ///
    /// # Arguments
    /// * `base_path` - Root directory for uploaded files (e.g., "./uploads")
    /// * `base_url` - Public path the directory is served under (e.g., "/uploads")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let base_path = base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to resolve upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Absolute upload directory
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Keys are single path components; anything that could escape the
    /// upload directory is rejected.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key == "."
            || storage_key == ".."
            || storage_key.contains(['/', '\\'])
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Generate public URL for file; the key is percent-encoded as one path segment
    fn generate_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            utf8_percent_encode(key, URL_SEGMENT)
        )
    }

    fn payload_key<'a>(&self, payload: &'a AttachmentPayload) -> StorageResult<&'a str> {
        match payload {
            AttachmentPayload::External { storage_key, .. } => Ok(storage_key),
            AttachmentPayload::Inline(_) => Err(StorageError::InvalidKey(
                "Inline payload cannot be resolved by local storage".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        file_name: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<AttachmentPayload> {
        if data.is_empty() {
            return Err(StorageError::EmptyFile);
        }

        let key = generate_storage_key(file_name);
        let path = self.key_to_path(&key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(AttachmentPayload::External {
            storage_key: key,
            url,
        })
    }

    async fn get(&self, payload: &AttachmentPayload) -> StorageResult<Vec<u8>> {
        let storage_key = self.payload_key(payload)?;
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn delete(&self, payload: &AttachmentPayload) -> StorageResult<()> {
        let storage_key = self.payload_key(payload)?;
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        match fs::remove_file(&path).await {
            Ok(()) => {}
            // Lost a race with another delete
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, payload: &AttachmentPayload) -> StorageResult<bool> {
        let storage_key = self.payload_key(payload)?;
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn external(key: &str) -> AttachmentPayload {
        AttachmentPayload::External {
            storage_key: key.to_string(),
            url: format!("/uploads/{}", key),
        }
    }

    #[tokio::test]
    async fn test_local_storage_put_get() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let data = b"test data".to_vec();
        let payload = storage
            .put("test.txt", "text/plain", data.clone())
            .await
            .unwrap();

        match &payload {
            AttachmentPayload::External { storage_key, url } => {
                assert!(storage_key.ends_with("_test.txt"));
                assert_eq!(url, &format!("/uploads/{}", storage_key));
                assert!(dir.path().join(storage_key).exists());
            }
            AttachmentPayload::Inline(_) => panic!("Expected external payload"),
        }

        let downloaded = storage.get(&payload).await.unwrap();
        assert_eq!(data, downloaded);
    }

    #[tokio::test]
    async fn test_url_escapes_reserved_characters() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let payload = storage
            .put("a%41 q?#1.txt", "text/plain", b"x".to_vec())
            .await
            .unwrap();
        let AttachmentPayload::External { storage_key, url } = &payload else {
            panic!("Expected external payload");
        };
        assert!(storage_key.ends_with("_a%41 q?#1.txt"));
        assert!(url.ends_with("_a%2541%20q%3F%231.txt"));
        assert!(dir.path().join(storage_key).exists());

        assert_eq!(
            storage.generate_url("r\u{e9}sum\u{e9}.txt"),
            "/uploads/r%C3%A9sum%C3%A9.txt"
        );
    }

    #[tokio::test]
    async fn test_creates_missing_upload_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = LocalStorage::new(&nested, "/uploads".to_string())
            .await
            .unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn test_empty_file_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let result = storage.put("empty.txt", "text/plain", Vec::new()).await;
        assert!(matches!(result, Err(StorageError::EmptyFile)));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let result = storage.get(&external("../../../etc/passwd")).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete(&external("../etc/passwd")).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists(&external("/etc/passwd")).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_traversal_in_original_name_stays_inside_directory() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let payload = storage
            .put("../../escape.txt", "text/plain", b"x".to_vec())
            .await
            .unwrap();
        assert!(storage.exists(&payload).await.unwrap());
        assert!(!dir.path().join("..").join("escape.txt").exists());

        // Dots inside a single component are harmless
        let payload = storage
            .put("draft..v2.txt", "text/plain", b"x".to_vec())
            .await
            .unwrap();
        assert!(storage.exists(&payload).await.unwrap());
    }

    #[tokio::test]
    async fn test_local_storage_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let result = storage.delete(&external("nonexistent.txt")).await;
        assert!(result.is_ok());

        let payload = storage
            .put("gone.txt", "text/plain", b"bye".to_vec())
            .await
            .unwrap();
        storage.delete(&payload).await.unwrap();
        assert!(!storage.exists(&payload).await.unwrap());
        storage.delete(&payload).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let result = storage.get(&external("missing.txt")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_inline_payload_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/uploads".to_string())
            .await
            .unwrap();

        let result = storage.get(&AttachmentPayload::Inline(vec![1])).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
