//! Error types for the captain plugin

use thiserror::Error;

use crate::release::codec::DecodeError;
use crate::watch::watcher::WatchError;

/// Main error type for the captain plugin
#[derive(Error, Debug)]
pub enum CaptainError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Kubeconfig error: {0}")]
    KubeconfigError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid values: {0}")]
    ValuesError(String),

    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("{summary}")]
    ReconcileError {
        summary: String,
        #[source]
        source: WatchError,
    },
}

impl CaptainError {
    /// Whether the error means the object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CaptainError::NotFound(_))
    }
}
