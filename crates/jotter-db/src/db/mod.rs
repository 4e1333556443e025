//! Database repositories for the data access layer
//
// Note repositories (trait, PostgreSQL, in-memory)
pub mod memory;
pub mod note;

pub use memory::InMemoryNoteRepository;
pub use note::{create_note_repository, NoteRepositoryTrait, PostgresNoteRepository};

/// Migrations under `crates/jotter-db/migrations`, embedded at compile time.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
