//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p jotter-api --test notes_test`.
//! Notes live in the in-memory repository, so no database is required.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use jotter_api::setup::routes;
use jotter_api::{AppState, NoteService};
use jotter_core::{Config, StorageBackend};
use jotter_db::InMemoryNoteRepository;
use jotter_storage::{InlineStorage, LocalStorage, Storage};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const MB: usize = 1024 * 1024;

/// Test application: server plus the upload directory it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Number of files currently in the upload directory.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir()).unwrap().count()
    }
}

/// Setup a test app with the external-file attachment variant.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(StorageBackend::Local).await
}

pub async fn setup_test_app_with(backend: StorageBackend) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let config = Config {
        storage_backend: backend,
        upload_dir: temp_dir.path().to_string_lossy().to_string(),
        ..Config::default()
    };

    let storage: Arc<dyn Storage> = match backend {
        StorageBackend::Local => Arc::new(
            LocalStorage::new(temp_dir.path(), config.uploads_url_path.clone())
                .await
                .expect("Failed to create local storage"),
        ),
        StorageBackend::Inline => Arc::new(InlineStorage::new()),
    };

    let notes = NoteService::new(
        Arc::new(InMemoryNoteRepository::new()),
        storage,
        config.max_file_size_bytes,
    );
    let state = Arc::new(AppState::new(notes));

    let router = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, temp_dir }
}

/// Multipart body with the two text fields.
pub fn note_form(title: &str, content: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("content", content.to_string())
}

/// Multipart body with text fields and a file.
pub fn note_form_with_file(
    title: &str,
    content: &str,
    file_name: &str,
    mime_type: &str,
    data: Vec<u8>,
) -> MultipartForm {
    let part = Part::bytes(data)
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string());
    note_form(title, content).add_part("file", part)
}

/// Create a note and return the response body.
pub async fn create_note(client: &TestServer, form: MultipartForm) -> serde_json::Value {
    let response = client.post("/api/notes").multipart(form).await;
    assert_eq!(response.status_code(), 201, "create failed: {}", response.text());
    response.json()
}
