pub mod notes;

pub use notes::{FileDownload, NoteService};
