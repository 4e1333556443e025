use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::extract::{rejection::PathRejection, Path, State};
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    tag = "notes",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted", body = String, content_type = "text/plain"),
        (status = 404, description = "Note not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, id),
    fields(note_id = tracing::field::Empty, operation = "delete_note")
)]
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<&'static str, HttpAppError> {
    let Path(id) = id?;
    tracing::Span::current().record("note_id", id);

    state.notes.delete_note(id).await?;
    Ok("Note deleted successfully")
}
