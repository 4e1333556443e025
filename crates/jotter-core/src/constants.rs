//! Shared constants

/// Default attachment size limit in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 5;

/// Largest accepted `MAX_FILE_SIZE_MB`; uploads are buffered in memory.
pub const MAX_FILE_SIZE_LIMIT_MB: usize = 1024;

/// Default directory for the external-file attachment variant.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Public path prefix under which stored attachments are served.
pub const DEFAULT_UPLOADS_URL_PATH: &str = "/uploads";

/// Content type used when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

