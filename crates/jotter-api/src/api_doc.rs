//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use jotter_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jotter API",
        version = "0.1.0",
        description = "Notes with an optional file attachment. Attachments are stored on disk or inline with the note, depending on server configuration."
    ),
    paths(
        handlers::note_get::list_notes,
        handlers::note_get::get_note,
        handlers::note_upload::create_note,
        handlers::note_upload::update_note,
        handlers::note_delete::delete_note,
        handlers::note_download::download_file,
    ),
    components(
        schemas(
            models::NoteView,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "notes", description = "Note management and attachment download")
    )
)]
pub struct ApiDoc;
