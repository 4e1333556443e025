use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Where an attachment's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentPayload {
    /// File written by the external-file backend.
    External { storage_key: String, url: String },
    /// Bytes kept directly on the note row.
    Inline(Vec<u8>),
}

impl AttachmentPayload {
    /// Public URL for externally stored files; `None` for inline payloads.
    pub fn url(&self) -> Option<&str> {
        match self {
            AttachmentPayload::External { url, .. } => Some(url),
            AttachmentPayload::Inline(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AttachmentPayload::External { storage_key, url } => {
                storage_key.is_empty() || url.is_empty()
            }
            AttachmentPayload::Inline(data) => data.is_empty(),
        }
    }
}

/// A file attached to a note. The name, type and payload are set together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteAttachment {
    pub file_name: String,
    pub file_type: String,
    pub payload: AttachmentPayload,
}

/// Persisted note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub attachment: Option<NoteAttachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Whether the note carries a non-empty attachment payload.
    pub fn has_file(&self) -> bool {
        self.attachment
            .as_ref()
            .is_some_and(|attachment| !attachment.payload.is_empty())
    }

    /// Build the outward-facing view; `has_file` is derived here and nowhere else.
    pub fn to_view(&self) -> NoteView {
        let attachment = self.attachment.as_ref();
        NoteView {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            file_name: attachment.map(|a| a.file_name.clone()),
            file_type: attachment.map(|a| a.file_type.clone()),
            attachment_url: attachment.and_then(|a| a.payload.url()).map(String::from),
            has_file: self.has_file(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Values for inserting a new note row
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub attachment: Option<NoteAttachment>,
    pub created_at: DateTime<Utc>,
}

/// Values written by an update. `attachment: None` leaves the stored attachment as it is.
#[derive(Debug, Clone)]
pub struct NoteChanges {
    pub title: String,
    pub content: String,
    pub attachment: Option<NoteAttachment>,
    pub updated_at: DateTime<Utc>,
}

/// Note representation returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    pub has_file: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Text fields of a create/update request
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct NoteForm {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,
    pub content: String,
}

/// A file received from a client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_with(attachment: Option<NoteAttachment>) -> Note {
        let now = Utc::now();
        Note {
            id: 7,
            title: "Groceries".to_string(),
            content: "eggs".to_string(),
            attachment,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_view_without_attachment() {
        let view = note_with(None).to_view();
        assert!(!view.has_file);
        assert_eq!(view.file_name, None);
        assert_eq!(view.attachment_url, None);
    }

    #[test]
    fn test_view_with_external_attachment_exposes_url() {
        let view = note_with(Some(NoteAttachment {
            file_name: "list.txt".to_string(),
            file_type: "text/plain".to_string(),
            payload: AttachmentPayload::External {
                storage_key: "abc_list.txt".to_string(),
                url: "/uploads/abc_list.txt".to_string(),
            },
        }))
        .to_view();
        assert!(view.has_file);
        assert_eq!(view.file_name.as_deref(), Some("list.txt"));
        assert_eq!(view.attachment_url.as_deref(), Some("/uploads/abc_list.txt"));
    }

    #[test]
    fn test_view_with_inline_attachment_has_no_url() {
        let view = note_with(Some(NoteAttachment {
            file_name: "a.bin".to_string(),
            file_type: "application/octet-stream".to_string(),
            payload: AttachmentPayload::Inline(vec![1, 2, 3]),
        }))
        .to_view();
        assert!(view.has_file);
        assert_eq!(view.attachment_url, None);
    }

    #[test]
    fn test_empty_inline_payload_is_not_a_file() {
        let note = note_with(Some(NoteAttachment {
            file_name: "a.bin".to_string(),
            file_type: "application/octet-stream".to_string(),
            payload: AttachmentPayload::Inline(Vec::new()),
        }));
        assert!(!note.has_file());
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let json = serde_json::to_value(note_with(None).to_view()).unwrap();
        assert_eq!(json["hasFile"], serde_json::json!(false));
        assert!(json.get("createdAt").is_some());
        assert!(json.get("fileName").is_some());
        assert!(json.get("attachmentUrl").is_none());
    }

    #[test]
    fn test_form_rejects_empty_title() {
        let form = NoteForm {
            title: String::new(),
            content: "body".to_string(),
        };
        assert!(form.validate().is_err());

        let form = NoteForm {
            title: "ok".to_string(),
            content: String::new(),
        };
        assert!(form.validate().is_ok());
    }
}
