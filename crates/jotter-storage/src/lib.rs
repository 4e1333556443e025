//! Jotter Storage Library
//!
//! Attachment storage abstraction and its two implementations: files on the
//! local filesystem (`LocalStorage`) and bytes kept inline on the note row
//! (`InlineStorage`).
//!
//! # Storage key format
//!
//! Local keys are flat file names: `{uuid}_{sanitized original name}`.
//! Keys are a single path component: no path separators, and never `.` or `..`.

pub mod factory;
#[cfg(feature = "storage-inline")]
pub mod inline;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-inline")]
pub use inline::InlineStorage;
pub use jotter_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
