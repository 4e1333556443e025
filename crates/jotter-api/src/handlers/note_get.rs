use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use jotter_core::models::NoteView;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/notes",
    tag = "notes",
    responses(
        (status = 200, description = "All notes, most recently updated first", body = Vec<NoteView>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_notes"))]
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NoteView>>, HttpAppError> {
    let notes = state.notes.list_notes().await?;
    Ok(Json(notes))
}

#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    tag = "notes",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteView),
        (status = 400, description = "Invalid note ID", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, id),
    fields(note_id = tracing::field::Empty, operation = "get_note")
)]
pub async fn get_note(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<NoteView>, HttpAppError> {
    let Path(id) = id?;
    tracing::Span::current().record("note_id", id);

    let note = state.notes.get_note(id).await?;
    Ok(Json(note))
}
