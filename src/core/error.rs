//! Error types for projmap

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using projmap's Error
pub type Result<T> = std::result::Result<T, Error>;

/// projmap error types
///
/// Only invalid input surfaces here. Unreadable files, unreadable directories,
/// cache misses and failed cache writes are recovered where they happen.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Project root not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Project root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
