//! Note operations: validation, attachment storage and persistence.
//!
//! Keeps handler logic thin and allows unit testing without HTTP.
//!
//! Files are written before the row that references them. If the row write
//! fails the new file is removed again; a replaced or deleted attachment is
//! only removed after the row change has been committed.

use crate::error::storage_error_to_app_error;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use jotter_core::constants::DEFAULT_CONTENT_TYPE;
use jotter_core::models::{
    AttachmentPayload, NewNote, Note, NoteAttachment, NoteChanges, NoteForm, NoteView,
    UploadedFile,
};
use jotter_core::AppError;
use jotter_db::NoteRepositoryTrait;
use jotter_storage::{Storage, StorageBackend};
use std::sync::Arc;
use validator::Validate;

/// A stored attachment ready to be sent to a client.
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub file_type: String,
}

#[derive(Clone)]
pub struct NoteService {
    repository: Arc<dyn NoteRepositoryTrait>,
    storage: Arc<dyn Storage>,
    max_file_size: usize,
}

impl NoteService {
    pub fn new(
        repository: Arc<dyn NoteRepositoryTrait>,
        storage: Arc<dyn Storage>,
        max_file_size: usize,
    ) -> Self {
        Self {
            repository,
            storage,
            max_file_size,
        }
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend_type()
    }

    /// All notes, most recently updated first.
    pub async fn list_notes(&self) -> Result<Vec<NoteView>, AppError> {
        let notes = self.repository.list_by_updated_desc().await?;
        Ok(notes.iter().map(Note::to_view).collect())
    }

    pub async fn get_note(&self, id: i64) -> Result<NoteView, AppError> {
        Ok(self.find(id).await?.to_view())
    }

    #[tracing::instrument(skip(self, form, file), fields(has_file = file.is_some()))]
    pub async fn create_note(
        &self,
        form: NoteForm,
        file: Option<UploadedFile>,
    ) -> Result<NoteView, AppError> {
        form.validate()?;

        let file = file.filter(|f| !f.is_empty());
        if let Some(file) = &file {
            self.validate_file_size(file)?;
        }

        let attachment = match file {
            Some(file) => Some(self.store_file(file).await?),
            None => None,
        };

        let new_note = NewNote {
            title: form.title,
            content: form.content,
            attachment: attachment.clone(),
            created_at: now(),
        };

        match self.repository.insert(new_note).await {
            Ok(note) => {
                tracing::info!(note_id = note.id, has_file = note.has_file(), "Note created");
                Ok(note.to_view())
            }
            Err(e) => {
                if let Some(attachment) = &attachment {
                    self.discard(&attachment.payload, "Failed to remove orphaned attachment")
                        .await;
                }
                Err(e)
            }
        }
    }

    /// Replace title and content; a non-empty `file` replaces the attachment,
    /// otherwise the current one is kept.
    #[tracing::instrument(skip(self, form, file), fields(has_file = file.is_some()))]
    pub async fn update_note(
        &self,
        id: i64,
        form: NoteForm,
        file: Option<UploadedFile>,
    ) -> Result<NoteView, AppError> {
        let existing = self.find(id).await?;
        form.validate()?;

        let file = file.filter(|f| !f.is_empty());
        if let Some(file) = &file {
            self.validate_file_size(file)?;
        }

        let new_attachment = match file {
            Some(file) => Some(self.store_file(file).await?),
            None => None,
        };

        let changes = NoteChanges {
            title: form.title,
            content: form.content,
            attachment: new_attachment.clone(),
            updated_at: next_updated_at(existing.updated_at),
        };

        let saved = match self.repository.update(id, &changes).await {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                // Deleted between lookup and write
                if let Some(attachment) = &new_attachment {
                    self.discard(&attachment.payload, "Failed to remove orphaned attachment")
                        .await;
                }
                return Err(AppError::note_not_found(id));
            }
            Err(e) => {
                if let Some(attachment) = &new_attachment {
                    self.discard(&attachment.payload, "Failed to remove orphaned attachment")
                        .await;
                }
                return Err(e);
            }
        };

        if new_attachment.is_some() {
            if let Some(previous) = &existing.attachment {
                self.discard(&previous.payload, "Failed to remove replaced attachment")
                    .await;
            }
        }

        tracing::info!(note_id = saved.id, has_file = saved.has_file(), "Note updated");

        Ok(saved.to_view())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_note(&self, id: i64) -> Result<(), AppError> {
        let existing = self.find(id).await?;

        if !self.repository.delete(id).await? {
            return Err(AppError::note_not_found(id));
        }

        if let Some(attachment) = &existing.attachment {
            self.discard(&attachment.payload, "Failed to remove attachment of deleted note")
                .await;
        }

        tracing::info!(note_id = id, "Note deleted");

        Ok(())
    }

    pub async fn get_file_data(&self, id: i64) -> Result<Vec<u8>, AppError> {
        let attachment = self.attachment(id).await?;
        self.storage
            .get(&attachment.payload)
            .await
            .map_err(storage_error_to_app_error)
    }

    pub async fn get_file_name(&self, id: i64) -> Result<String, AppError> {
        Ok(self.attachment(id).await?.file_name)
    }

    pub async fn get_file_type(&self, id: i64) -> Result<String, AppError> {
        Ok(self.attachment(id).await?.file_type)
    }

    /// Bytes, name and type of a note's attachment, read from a single lookup.
    pub async fn download(&self, id: i64) -> Result<FileDownload, AppError> {
        let attachment = self.attachment(id).await?;
        let data = self
            .storage
            .get(&attachment.payload)
            .await
            .map_err(storage_error_to_app_error)?;

        Ok(FileDownload {
            data,
            file_name: attachment.file_name,
            file_type: attachment.file_type,
        })
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Query the attachment backend with a key that never exists.
    pub async fn check_storage(&self) -> Result<(), AppError> {
        let missing = match self.storage.backend_type() {
            StorageBackend::Local => AttachmentPayload::External {
                storage_key: "health-check-non-existent-key".to_string(),
                url: String::new(),
            },
            StorageBackend::Inline => AttachmentPayload::Inline(Vec::new()),
        };
        self.storage
            .exists(&missing)
            .await
            .map(drop)
            .map_err(storage_error_to_app_error)
    }

    async fn find(&self, id: i64) -> Result<Note, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::note_not_found(id))
    }

    async fn attachment(&self, id: i64) -> Result<NoteAttachment, AppError> {
        let note = self.find(id).await?;
        match note.attachment {
            Some(attachment) if !attachment.payload.is_empty() => Ok(attachment),
            _ => Err(AppError::NoAttachment(format!(
                "Note {} has no attached file",
                id
            ))),
        }
    }

    fn validate_file_size(&self, file: &UploadedFile) -> Result<(), AppError> {
        if file.len() > self.max_file_size {
            return Err(AppError::Validation(format!(
                "File size exceeds maximum limit of {}MB",
                self.max_file_size / 1024 / 1024
            )));
        }
        Ok(())
    }

    async fn store_file(&self, file: UploadedFile) -> Result<NoteAttachment, AppError> {
        let file_type = if file.content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            file.content_type
        };

        let payload = self
            .storage
            .put(&file.file_name, &file_type, file.data)
            .await
            .map_err(storage_error_to_app_error)?;

        Ok(NoteAttachment {
            file_name: file.file_name,
            file_type,
            payload,
        })
    }

    /// Best-effort removal; failures are logged and swallowed.
    async fn discard(&self, payload: &AttachmentPayload, message: &str) {
        if let Err(e) = self.storage.delete(payload).await {
            tracing::warn!(error = %e, attachment_url = ?payload.url(), "{}", message);
        }
    }
}

/// Timestamps are kept at microsecond precision, which is what PostgreSQL stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Next `updated_at` for a note: the current time, but always after `previous`.
fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let candidate = now();
    if candidate > previous {
        candidate
    } else {
        previous + Duration::microseconds(1)
    }
}
