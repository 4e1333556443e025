pub mod note_delete;
pub mod note_download;
pub mod note_get;
pub mod note_upload;
mod multipart;
