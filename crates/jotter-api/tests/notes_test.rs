//! Notes API integration tests.
//!
//! Run with: `cargo test -p jotter-api --test notes_test`

mod helpers;

use helpers::{
    create_note, note_form, note_form_with_file, setup_test_app, setup_test_app_with, MB,
};
use jotter_core::StorageBackend;

#[tokio::test]
async fn test_create_update_delete_workflow() {
    let app = setup_test_app().await;
    let client = app.client();

    let created = create_note(client, note_form("A", "B")).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["title"], "A");
    assert_eq!(created["hasFile"], false);
    assert!(created["fileName"].is_null());

    let response = client
        .put("/api/notes/1")
        .multipart(note_form_with_file(
            "C",
            "D",
            "notes.txt",
            "text/plain",
            b"hello".to_vec(),
        ))
        .await;
    assert_eq!(response.status_code(), 200);
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["title"], "C");
    assert_eq!(updated["content"], "D");
    assert_eq!(updated["hasFile"], true);
    assert_eq!(updated["fileName"], "notes.txt");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let response = client.delete("/api/notes/1").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "Note deleted successfully");

    let response = client.get("/api/notes/1").await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Note not found with id: 1");
    assert_eq!(body["code"], "NOT_FOUND");

    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_list_notes_most_recent_first() {
    let app = setup_test_app().await;
    let client = app.client();

    let first = create_note(client, note_form("first", "")).await;
    create_note(client, note_form("second", "")).await;

    let response = client
        .put(&format!("/api/notes/{}", first["id"]))
        .multipart(note_form("first edited", ""))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = client.get("/api/notes").await;
    assert_eq!(response.status_code(), 200);
    let notes: Vec<serde_json::Value> = response.json();
    let titles: Vec<&str> = notes.iter().filter_map(|n| n["title"].as_str()).collect();
    assert_eq!(titles, vec!["first edited", "second"]);
}

#[tokio::test]
async fn test_list_empty() {
    let app = setup_test_app().await;
    let response = app.client().get("/api/notes").await;
    assert_eq!(response.status_code(), 200);
    let notes: Vec<serde_json::Value> = response.json();
    assert!(notes.is_empty());
}

#[tokio::test]
async fn test_download_round_trip_external_variant() {
    let app = setup_test_app().await;
    let client = app.client();

    let data = vec![0x25, 0x50, 0x44, 0x46, 0x2d, 0x31];
    let created = create_note(
        client,
        note_form_with_file("report", "q3", "report.pdf", "application/pdf", data.clone()),
    )
    .await;
    assert_eq!(created["hasFile"], true);
    assert_eq!(created["fileType"], "application/pdf");
    let url = created["attachmentUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert_eq!(app.stored_files(), 1);

    let response = client
        .get(&format!("/api/notes/{}/file", created["id"]))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().to_vec(), data);
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"report.pdf\""
    );

    // The stored file is also served statically
    let response = client.get(&url).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().to_vec(), data);
}

#[tokio::test]
async fn test_download_round_trip_inline_variant() {
    let app = setup_test_app_with(StorageBackend::Inline).await;
    let client = app.client();

    let data = b"inline bytes".to_vec();
    let created = create_note(
        client,
        note_form_with_file("t", "", "data.bin", "application/octet-stream", data.clone()),
    )
    .await;
    assert_eq!(created["hasFile"], true);
    assert!(created.get("attachmentUrl").is_none());
    assert_eq!(app.stored_files(), 0);

    let response = client
        .get(&format!("/api/notes/{}/file", created["id"]))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().to_vec(), data);
    assert_eq!(response.header("content-type"), "application/octet-stream");
}

#[tokio::test]
async fn test_replacing_attachment_removes_old_file() {
    let app = setup_test_app().await;
    let client = app.client();

    let created = create_note(
        client,
        note_form_with_file("t", "", "v1.txt", "text/plain", b"one".to_vec()),
    )
    .await;
    let id = created["id"].clone();

    let response = client
        .put(&format!("/api/notes/{}", id))
        .multipart(note_form_with_file(
            "t",
            "",
            "v2.txt",
            "text/plain",
            b"two".to_vec(),
        ))
        .await;
    assert_eq!(response.status_code(), 200);
    let updated: serde_json::Value = response.json();
    assert_ne!(updated["attachmentUrl"], created["attachmentUrl"]);
    assert_eq!(app.stored_files(), 1);

    let response = client.get(&format!("/api/notes/{}/file", id)).await;
    assert_eq!(response.as_bytes().to_vec(), b"two".to_vec());
}

#[tokio::test]
async fn test_update_without_file_keeps_attachment() {
    let app = setup_test_app().await;
    let client = app.client();

    let created = create_note(
        client,
        note_form_with_file("t", "", "keep.txt", "text/plain", b"keep".to_vec()),
    )
    .await;

    let response = client
        .put(&format!("/api/notes/{}", created["id"]))
        .multipart(note_form("renamed", "new body"))
        .await;
    assert_eq!(response.status_code(), 200);
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["hasFile"], true);
    assert_eq!(updated["fileName"], "keep.txt");
    assert_eq!(updated["attachmentUrl"], created["attachmentUrl"]);
}

#[tokio::test]
async fn test_oversized_file_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let created = create_note(
        client,
        note_form_with_file("t", "", "small.txt", "text/plain", b"small".to_vec()),
    )
    .await;

    let response = client
        .put(&format!("/api/notes/{}", created["id"]))
        .multipart(note_form_with_file(
            "t",
            "",
            "big.bin",
            "application/octet-stream",
            vec![0u8; 5 * MB + 1],
        ))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "File size exceeds maximum limit of 5MB");
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let response = client
        .get(&format!("/api/notes/{}/file", created["id"]))
        .await;
    assert_eq!(response.as_bytes().to_vec(), b"small".to_vec());
    assert_eq!(app.stored_files(), 1);

    let response = client
        .post("/api/notes")
        .multipart(note_form_with_file(
            "new",
            "",
            "big.bin",
            "application/octet-stream",
            vec![0u8; 5 * MB + 1],
        ))
        .await;
    assert_eq!(response.status_code(), 400);

    let notes: Vec<serde_json::Value> = client.get("/api/notes").await.json();
    assert_eq!(notes.len(), 1);
}

#[tokio::test]
async fn test_validation_errors() {
    let app = setup_test_app().await;
    let client = app.client();

    // Empty title
    let response = client
        .post("/api/notes")
        .multipart(note_form("", "body"))
        .await;
    assert_eq!(response.status_code(), 400);

    // Missing content field
    let form = axum_test::multipart::MultipartForm::new().add_text("title", "only title");
    let response = client.post("/api/notes").multipart(form).await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");

    // Non-numeric id
    let response = client.get("/api/notes/abc").await;
    assert_eq!(response.status_code(), 400);

    let notes: Vec<serde_json::Value> = client.get("/api/notes").await.json();
    assert!(notes.is_empty());
}

#[tokio::test]
async fn test_missing_note_and_missing_attachment() {
    let app = setup_test_app().await;
    let client = app.client();

    assert_eq!(client.get("/api/notes/42").await.status_code(), 404);
    assert_eq!(client.delete("/api/notes/42").await.status_code(), 404);
    assert_eq!(client.get("/api/notes/42/file").await.status_code(), 404);

    let response = client
        .put("/api/notes/42")
        .multipart(note_form("t", ""))
        .await;
    assert_eq!(response.status_code(), 404);

    let created = create_note(client, note_form("no file", "")).await;
    let response = client
        .get(&format!("/api/notes/{}/file", created["id"]))
        .await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NO_ATTACHMENT");
}

#[tokio::test]
async fn test_delete_unknown_id_leaves_other_notes() {
    let app = setup_test_app().await;
    let client = app.client();

    let kept = create_note(
        client,
        note_form_with_file("kept", "", "kept.txt", "text/plain", b"kept".to_vec()),
    )
    .await;

    let response = client.delete("/api/notes/999").await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");

    let notes: Vec<serde_json::Value> = client.get("/api/notes").await.json();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["id"], kept["id"]);
    assert_eq!(app.stored_files(), 1);
}

#[tokio::test]
async fn test_attachment_urls_with_reserved_characters() {
    let app = setup_test_app().await;
    let client = app.client();

    for name in ["a%41.txt", "q?.txt", "notes #1.txt", "résumé.txt"] {
        let data = format!("contents of {}", name).into_bytes();
        let created = create_note(
            client,
            note_form_with_file("t", "", name, "text/plain", data.clone()),
        )
        .await;
        assert_eq!(created["fileName"], name);

        let url = created["attachmentUrl"].as_str().unwrap().to_string();
        assert!(!url.contains(['?', '#', ' ']), "unescaped url: {}", url);

        let response = client.get(&url).await;
        assert_eq!(response.status_code(), 200, "GET {} failed", url);
        assert_eq!(response.as_bytes().to_vec(), data);
    }
    assert_eq!(app.stored_files(), 4);
}

#[tokio::test]
async fn test_download_keeps_non_ascii_file_name() {
    let app = setup_test_app_with(StorageBackend::Inline).await;
    let client = app.client();

    let created = create_note(
        client,
        note_form_with_file("t", "", "résumé.txt", "text/plain", b"cv".to_vec()),
    )
    .await;

    let response = client
        .get(&format!("/api/notes/{}/file", created["id"]))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"r_sum_.txt\"; filename*=UTF-8''r%C3%A9sum%C3%A9.txt"
    );
}

#[tokio::test]
async fn test_empty_file_part_is_ignored() {
    let app = setup_test_app().await;
    let created = create_note(
        app.client(),
        note_form_with_file("t", "", "empty.txt", "text/plain", Vec::new()),
    )
    .await;
    assert_eq!(created["hasFile"], false);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["database"], "healthy");
    assert_eq!(body["storage"], "healthy");
    assert_eq!(body["storage_backend"], "local");

    assert_eq!(client.get("/live").await.status_code(), 200);
    assert_eq!(client.get("/ready").await.status_code(), 200);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = setup_test_app().await;
    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["paths"].get("/api/notes/{id}/file").is_some());
}
