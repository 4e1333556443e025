use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::multipart::extract_note_form;
use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use jotter_core::models::NoteView;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/notes",
    tag = "notes",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Fields: title (required, non-empty), content (required), file (optional)"
    ),
    responses(
        (status = 201, description = "Note created", body = NoteView),
        (status = 400, description = "Invalid input or file too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "create_note"))]
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<NoteView>), HttpAppError> {
    let (form, file) = extract_note_form(multipart).await?;
    let note = state.notes.create_note(form, file).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    tag = "notes",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Fields: title (required, non-empty), content (required), file (optional; replaces the current attachment)"
    ),
    responses(
        (status = 200, description = "Note updated", body = NoteView),
        (status = 400, description = "Invalid input or file too large", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, id, multipart),
    fields(note_id = tracing::field::Empty, operation = "update_note")
)]
pub async fn update_note(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    multipart: Multipart,
) -> Result<Json<NoteView>, HttpAppError> {
    let Path(id) = id?;
    tracing::Span::current().record("note_id", id);

    let (form, file) = extract_note_form(multipart).await?;
    let note = state.notes.update_note(id, form, file).await?;
    Ok(Json(note))
}
