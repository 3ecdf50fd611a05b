use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoopFetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No manifest registered for {product} content from {year}")]
    UnknownManifest { product: String, year: String },

    #[error("Failed to fetch manifest from {url}: {reason}")]
    ManifestFetch { url: String, reason: String },

    #[error("Failed to parse manifest {path}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    #[error("Failed to download {url}: {reason}")]
    Transfer { url: String, reason: String },

    #[error("Download directory creation failed at {path}: {reason}")]
    DownloadDirectoryCreation { path: PathBuf, reason: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid command line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Interrupted by user")]
    Interrupted,

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}
