//! Error types for cookie-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from the reconciliation core
    #[error(transparent)]
    Core(#[from] cookie_core::Error),

    /// Error from the Firefox profile or permission store
    #[error(transparent)]
    Firefox(#[from] cookie_firefox::Error),

    /// Error from the WebDAV remote
    #[error(transparent)]
    Remote(#[from] cookie_webdav::Error),

    /// Error from the rule model
    #[error(transparent)]
    Model(#[from] cookie_model::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON input
    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    /// Interactive prompt error
    #[error("Interactive prompt error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
