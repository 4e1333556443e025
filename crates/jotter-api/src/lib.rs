//! Jotter API Library
//!
//! HTTP handlers, the note service and application setup.

mod api_doc;
mod handlers;
mod telemetry;

pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::NoteService;
pub use state::AppState;
