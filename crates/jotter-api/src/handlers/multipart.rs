//! Multipart parsing shared by the create and update handlers

use axum::extract::Multipart;
use jotter_core::constants::DEFAULT_CONTENT_TYPE;
use jotter_core::models::{NoteForm, UploadedFile};
use jotter_core::AppError;

/// Read the `title`, `content` and optional `file` fields of a note form.
///
/// `title` and `content` are required (either may be empty at this point; the
/// service validates the title). Unknown fields are ignored. Only one `file`
/// field is accepted.
pub async fn extract_note_form(
    mut multipart: Multipart,
) -> Result<(NoteForm, Option<UploadedFile>), AppError> {
    let mut title: Option<String> = None;
    let mut content: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "title" | "content" => {
                let value = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read field '{}': {}", field_name, e))
                })?;
                if field_name == "title" {
                    title = Some(value);
                } else {
                    content = Some(value);
                }
            }
            "file" => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send at most one field named 'file'"
                            .to_string(),
                    ));
                }
                let file_name = field
                    .file_name()
                    .filter(|s| !s.is_empty())
                    .map(|s: &str| s.to_string())
                    .unwrap_or_else(|| "attachment".to_string());
                let content_type = field
                    .content_type()
                    .map(|s: &str| s.to_string())
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;

                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let title = title.ok_or_else(|| AppError::InvalidInput("Missing field 'title'".to_string()))?;
    let content =
        content.ok_or_else(|| AppError::InvalidInput("Missing field 'content'".to_string()))?;

    Ok((NoteForm { title, content }, file))
}
