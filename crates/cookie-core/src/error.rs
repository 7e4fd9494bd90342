//! Error types for cookie-core

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Rule error: {0}")]
    Model(#[from] cookie_model::Error),

    #[error("Permission store error: {0}")]
    Store(#[from] cookie_firefox::Error),

    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(#[from] cookie_webdav::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error("Configuration not found at {path}; run `cookie-sync init` first")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration already exists at {path}")]
    ConfigExists { path: PathBuf },

    #[error("Configuration incomplete: set {field} in {path}")]
    ConfigIncomplete { path: PathBuf, field: String },

    #[error("Invalid merge strategy: {value}")]
    InvalidMergeStrategy { value: String },

    #[error("Invalid backup interval '{value}': {reason}")]
    InvalidBackupInterval { value: String, reason: String },

    #[error("Panic condition: {details} (nothing was written)")]
    Panic { details: String },

    #[error("Impossible reconciliation state: {details}")]
    ImpossibleState { details: String },

    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}
