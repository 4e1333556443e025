//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::services::NoteService;
use crate::state::AppState;
use anyhow::{Context, Result};
use jotter_core::Config;
use jotter_db::create_note_repository;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        repository = %config.repository_backend,
        storage = %config.storage_backend,
        "Configuration loaded and validated successfully"
    );

    // Setup database (only for the PostgreSQL repository)
    let pool = database::setup_database(&config).await?;

    let repository = create_note_repository(&config, pool)
        .context("Failed to create note repository")?;

    // Setup attachment storage
    let storage = storage::setup_storage(&config).await?;

    let notes = NoteService::new(repository, storage, config.max_file_size_bytes);
    let state = Arc::new(AppState::new(notes));

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
