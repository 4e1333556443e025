//! Route configuration and setup.
//!
//! Note routes live under `/api/notes`; health checks in [health](health).

mod health;

use crate::api_doc::ApiDoc;
use crate::handlers::{note_delete, note_download, note_get, note_upload};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use jotter_core::{Config, StorageBackend};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for multipart framing and the text fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let note_body_limit = DefaultBodyLimit::max(body_limit(config.max_file_size_bytes));

    let mut app = Router::new()
        .merge(note_routes().layer(note_body_limit))
        .merge(public_routes())
        .with_state(state);

    if config.storage_backend == StorageBackend::Local {
        tracing::info!(
            url_path = %config.uploads_url_path,
            upload_dir = %config.upload_dir,
            "Serving stored attachments"
        );
        app = app.nest_service(&config.uploads_url_path, ServeDir::new(&config.upload_dir));
    }

    let app = app
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Oversized files must reach the service so they fail with a validation error.
fn body_limit(max_file_size: usize) -> usize {
    max_file_size.saturating_add(MULTIPART_OVERHEAD_BYTES)
}

fn note_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/notes",
            get(note_get::list_notes).post(note_upload::create_note),
        )
        .route(
            "/api/notes/{id}",
            get(note_get::get_note)
                .put(note_upload::update_note)
                .delete(note_delete::delete_note),
        )
        .route("/api/notes/{id}/file", get(note_download::download_file))
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.allows_any_origin() {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<HeaderValue>, _>>()?;
        tracing::info!(origins = ?config.cors_origins, "CORS restricted to configured origins");
        // Credentials rule out wildcard headers, so echo the requested ones
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(AllowHeaders::mirror_request())
            .expose_headers([header::CONTENT_DISPOSITION])
            .allow_credentials(true)
    };
    Ok(cors)
}
