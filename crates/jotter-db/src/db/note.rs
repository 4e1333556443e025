use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jotter_core::models::{AttachmentPayload, NewNote, Note, NoteAttachment, NoteChanges};
use jotter_core::{AppError, Config, RepositoryBackend};
use sqlx::{FromRow, PgPool, Postgres};
use std::sync::Arc;

use super::memory::InMemoryNoteRepository;

const NOTE_COLUMNS: &str = "id, title, content, file_name, file_type, storage_key, \
                            attachment_url, file_data, created_at, updated_at";

/// Persistence operations for notes
#[async_trait]
pub trait NoteRepositoryTrait: Send + Sync {
    /// All notes, most recently updated first
    async fn list_by_updated_desc(&self) -> Result<Vec<Note>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Note>, AppError>;

    /// Insert a note and return it with its generated id
    async fn insert(&self, note: NewNote) -> Result<Note, AppError>;

    /// Apply `changes` to an existing note; `None` if the id is unknown.
    ///
    /// The attachment columns are only written when `changes.attachment` is set.
    async fn update(&self, id: i64, changes: &NoteChanges) -> Result<Option<Note>, AppError>;

    /// Delete a note; `false` if the id is unknown
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<(), AppError>;
}

/// Row shape of the `notes` table
#[derive(Debug, FromRow)]
pub(crate) struct NoteRow {
    id: i64,
    title: String,
    content: String,
    file_name: Option<String>,
    file_type: Option<String>,
    storage_key: Option<String>,
    attachment_url: Option<String>,
    file_data: Option<Vec<u8>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        let payload = match (row.storage_key, row.attachment_url, row.file_data) {
            (Some(storage_key), Some(url), _) if !storage_key.is_empty() && !url.is_empty() => {
                Some(AttachmentPayload::External { storage_key, url })
            }
            (_, _, Some(data)) if !data.is_empty() => Some(AttachmentPayload::Inline(data)),
            _ => None,
        };

        // Partially populated attachment columns count as no attachment
        let attachment = match (row.file_name, row.file_type, payload) {
            (Some(file_name), Some(file_type), Some(payload)) => Some(NoteAttachment {
                file_name,
                file_type,
                payload,
            }),
            _ => None,
        };

        Note {
            id: row.id,
            title: row.title,
            content: row.content,
            attachment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Column values for an optional attachment
struct AttachmentColumns<'a> {
    file_name: Option<&'a str>,
    file_type: Option<&'a str>,
    storage_key: Option<&'a str>,
    attachment_url: Option<&'a str>,
    file_data: Option<&'a [u8]>,
}

impl<'a> From<Option<&'a NoteAttachment>> for AttachmentColumns<'a> {
    fn from(attachment: Option<&'a NoteAttachment>) -> Self {
        let Some(attachment) = attachment else {
            return Self {
                file_name: None,
                file_type: None,
                storage_key: None,
                attachment_url: None,
                file_data: None,
            };
        };

        let (storage_key, attachment_url, file_data) = match &attachment.payload {
            AttachmentPayload::External { storage_key, url } => {
                (Some(storage_key.as_str()), Some(url.as_str()), None)
            }
            AttachmentPayload::Inline(data) => (None, None, Some(data.as_slice())),
        };

        Self {
            file_name: Some(attachment.file_name.as_str()),
            file_type: Some(attachment.file_type.as_str()),
            storage_key,
            attachment_url,
            file_data,
        }
    }
}

/// PostgreSQL-backed note repository
#[derive(Clone)]
pub struct PostgresNoteRepository {
    pool: PgPool,
}

impl PostgresNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepositoryTrait for PostgresNoteRepository {
    #[tracing::instrument(skip(self), fields(db.table = "notes", db.operation = "select"))]
    async fn list_by_updated_desc(&self) -> Result<Vec<Note>, AppError> {
        let rows = sqlx::query_as::<Postgres, NoteRow>(&format!(
            "SELECT {} FROM notes ORDER BY updated_at DESC, id DESC",
            NOTE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "notes", db.operation = "select"))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Note>, AppError> {
        let row = sqlx::query_as::<Postgres, NoteRow>(&format!(
            "SELECT {} FROM notes WHERE id = $1",
            NOTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Note::from))
    }

    #[tracing::instrument(skip(self, note), fields(db.table = "notes", db.operation = "insert"))]
    async fn insert(&self, note: NewNote) -> Result<Note, AppError> {
        let columns = AttachmentColumns::from(note.attachment.as_ref());

        let row = sqlx::query_as::<Postgres, NoteRow>(&format!(
            r#"
            INSERT INTO notes (title, content, file_name, file_type, storage_key,
                               attachment_url, file_data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {}
            "#,
            NOTE_COLUMNS
        ))
        .bind(&note.title)
        .bind(&note.content)
        .bind(columns.file_name)
        .bind(columns.file_type)
        .bind(columns.storage_key)
        .bind(columns.attachment_url)
        .bind(columns.file_data)
        .bind(note.created_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(note_id = row.id, "Note inserted");

        Ok(row.into())
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "notes", db.operation = "update", note_id = id))]
    async fn update(&self, id: i64, changes: &NoteChanges) -> Result<Option<Note>, AppError> {
        let Some(attachment) = changes.attachment.as_ref() else {
            let row = sqlx::query_as::<Postgres, NoteRow>(&format!(
                r#"
                UPDATE notes
                SET title = $2, content = $3, updated_at = $4
                WHERE id = $1
                RETURNING {}
                "#,
                NOTE_COLUMNS
            ))
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.content)
            .bind(changes.updated_at)
            .fetch_optional(&self.pool)
            .await?;

            return Ok(row.map(Note::from));
        };

        let columns = AttachmentColumns::from(Some(attachment));

        let row = sqlx::query_as::<Postgres, NoteRow>(&format!(
            r#"
            UPDATE notes
            SET title = $2, content = $3, file_name = $4, file_type = $5,
                storage_key = $6, attachment_url = $7, file_data = $8, updated_at = $9
            WHERE id = $1
            RETURNING {}
            "#,
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(columns.file_name)
        .bind(columns.file_type)
        .bind(columns.storage_key)
        .bind(columns.attachment_url)
        .bind(columns.file_data)
        .bind(changes.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Note::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "notes", db.operation = "delete"))]
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create the note repository selected by `NOTES_DB_TYPE`.
///
/// The PostgreSQL backend needs a connected pool; the in-memory backend ignores it.
pub fn create_note_repository(
    config: &Config,
    pool: Option<PgPool>,
) -> Result<Arc<dyn NoteRepositoryTrait>, AppError> {
    match config.repository_backend {
        RepositoryBackend::Postgres => {
            let pool = pool.ok_or_else(|| {
                AppError::Internal("PostgreSQL note repository requires a pool".to_string())
            })?;
            tracing::info!("Initializing PostgreSQL note repository");
            Ok(Arc::new(PostgresNoteRepository::new(pool)))
        }
        RepositoryBackend::Memory => {
            tracing::warn!("Initializing in-memory note repository - notes are not persisted");
            Ok(Arc::new(InMemoryNoteRepository::new()))
        }
    }
}
