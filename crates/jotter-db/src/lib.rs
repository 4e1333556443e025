//! Jotter Database Library
//!
//! Note persistence: the repository trait, its PostgreSQL and in-memory
//! implementations, and the embedded SQL migrations.

pub mod db;

pub use db::{
    create_note_repository, InMemoryNoteRepository, NoteRepositoryTrait, PostgresNoteRepository,
    MIGRATOR,
};
