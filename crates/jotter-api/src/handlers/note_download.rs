use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderValue, Response, StatusCode},
};
use jotter_core::constants::DEFAULT_CONTENT_TYPE;
use jotter_core::AppError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::Arc;

/// RFC 5987 `attr-char`: everything else is percent-encoded in `filename*`.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

#[utoipa::path(
    get,
    path = "/api/notes/{id}/file",
    tag = "notes",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Attached file", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid note ID", body = ErrorResponse),
        (status = 404, description = "Note not found or has no attachment", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, id),
    fields(note_id = tracing::field::Empty, operation = "download_file")
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response<Body>, HttpAppError> {
    let Path(id) = id?;
    tracing::Span::current().record("note_id", id);

    let download = state.notes.download(id).await?;

    tracing::debug!(
        file_name = %download.file_name,
        size_bytes = download.data.len(),
        "Serving note attachment"
    );

    let content_type = HeaderValue::from_str(&download.file_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let content_disposition = content_disposition(&download.file_name);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .body(Body::from(download.data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// `attachment; filename="<name>"` with characters that would break the header replaced.
///
/// When the ASCII fallback is lossy the exact name is also sent as
/// `filename*=UTF-8''<percent-encoded>`.
fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    if safe == file_name {
        return format!("attachment; filename=\"{}\"", safe);
    }
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        safe,
        utf8_percent_encode(file_name, ATTR_CHAR)
    )
}
