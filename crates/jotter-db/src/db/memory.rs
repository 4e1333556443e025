use async_trait::async_trait;
use jotter_core::models::{NewNote, Note, NoteChanges};
use jotter_core::AppError;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::note::NoteRepositoryTrait;

#[derive(Debug)]
struct Inner {
    notes: BTreeMap<i64, Note>,
    next_id: i64,
}

/// Process-local note repository.
///
/// Used for development without PostgreSQL and by the test suites. Ids are
/// assigned sequentially from 1 and never reused.
#[derive(Debug)]
pub struct InMemoryNoteRepository {
    inner: RwLock<Inner>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                notes: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.notes.is_empty()
    }
}

impl Default for InMemoryNoteRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteRepositoryTrait for InMemoryNoteRepository {
    async fn list_by_updated_desc(&self) -> Result<Vec<Note>, AppError> {
        let inner = self.inner.read().await;
        let mut notes: Vec<Note> = inner.notes.values().cloned().collect();
        notes.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(notes)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Note>, AppError> {
        Ok(self.inner.read().await.notes.get(&id).cloned())
    }

    async fn insert(&self, note: NewNote) -> Result<Note, AppError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let stored = Note {
            id,
            title: note.title,
            content: note.content,
            attachment: note.attachment,
            created_at: note.created_at,
            updated_at: note.created_at,
        };
        inner.notes.insert(id, stored.clone());

        Ok(stored)
    }

    async fn update(&self, id: i64, changes: &NoteChanges) -> Result<Option<Note>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(existing) = inner.notes.get_mut(&id) else {
            return Ok(None);
        };

        existing.title = changes.title.clone();
        existing.content = changes.content.clone();
        if let Some(attachment) = &changes.attachment {
            existing.attachment = Some(attachment.clone());
        }
        existing.updated_at = changes.updated_at;

        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.write().await.notes.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
