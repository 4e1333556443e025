//! Configuration module
//!
//! Server, database and attachment storage settings, read from the
//! environment (and a `.env` file when present).

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_UPLOADS_URL_PATH, DEFAULT_UPLOAD_DIR, MAX_FILE_SIZE_LIMIT_MB,
};
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8080;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const BYTES_PER_MB: usize = 1024 * 1024;

/// Which note repository implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryBackend {
    Postgres,
    Memory,
}

impl FromStr for RepositoryBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(RepositoryBackend::Postgres),
            "memory" => Ok(RepositoryBackend::Memory),
            _ => Err(anyhow::anyhow!(
                "Invalid NOTES_DB_TYPE: {}. Must be 'postgres' or 'memory'",
                s
            )),
        }
    }
}

impl Display for RepositoryBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RepositoryBackend::Postgres => write!(f, "postgres"),
            RepositoryBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub repository_backend: RepositoryBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub storage_backend: StorageBackend,
    pub upload_dir: String,
    pub uploads_url_path: String,
    pub max_file_size_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            repository_backend: RepositoryBackend::Memory,
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: StorageBackend::Local,
            upload_dir: DEFAULT_UPLOAD_DIR.to_string(),
            uploads_url_path: DEFAULT_UPLOADS_URL_PATH.to_string(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * BYTES_PER_MB,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins =
            parse_cors_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));

        let repository_backend = env::var("NOTES_DB_TYPE")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let storage_backend = env::var("ATTACHMENT_STORAGE")
            .unwrap_or_else(|_| "local".to_string())
            .parse()?;

        let max_file_size_bytes = match env::var("MAX_FILE_SIZE_MB") {
            Ok(raw) => parse_max_file_size(&raw)?,
            Err(_) => DEFAULT_MAX_FILE_SIZE_MB * BYTES_PER_MB,
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            repository_backend,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            upload_dir: env::var("UPLOAD_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            uploads_url_path: normalize_url_path(
                &env::var("UPLOADS_URL_PATH")
                    .unwrap_or_else(|_| DEFAULT_UPLOADS_URL_PATH.to_string()),
            ),
            max_file_size_bytes,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.allows_any_origin() {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.repository_backend == RepositoryBackend::Postgres {
            match self.database_url.as_deref() {
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when NOTES_DB_TYPE is 'postgres'"
                    ))
                }
                Some(url) if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                Some(_) => {}
            }
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }

        if self.max_file_size_bytes > MAX_FILE_SIZE_LIMIT_MB * BYTES_PER_MB {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB must not exceed {}",
                MAX_FILE_SIZE_LIMIT_MB
            ));
        }

        if self.uploads_url_path == "/" || self.uploads_url_path.starts_with("/api") {
            return Err(anyhow::anyhow!(
                "UPLOADS_URL_PATH must not shadow the API routes"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Whether CORS is configured permissively (`*`).
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }

    pub fn max_file_size_mb(&self) -> usize {
        self.max_file_size_bytes / BYTES_PER_MB
    }
}

/// Parse `MAX_FILE_SIZE_MB` into a byte count.
pub fn parse_max_file_size(raw: &str) -> Result<usize, anyhow::Error> {
    let mb = raw.trim().parse::<usize>().map_err(|_| {
        anyhow::anyhow!("MAX_FILE_SIZE_MB must be a whole number of megabytes, got '{}'", raw)
    })?;

    if mb == 0 || mb > MAX_FILE_SIZE_LIMIT_MB {
        return Err(anyhow::anyhow!(
            "MAX_FILE_SIZE_MB must be between 1 and {}, got {}",
            MAX_FILE_SIZE_LIMIT_MB,
            mb
        ));
    }

    mb.checked_mul(BYTES_PER_MB)
        .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", mb))
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_cors_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}

/// Ensure a URL path has a single leading slash and no trailing slash.
fn normalize_url_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    format!("/{}", trimmed)
}
