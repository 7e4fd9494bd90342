//! Error types for cookie-webdav

use reqwest::{Method, StatusCode};

/// Result type for cookie-webdav operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from talking to the WebDAV server
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("WebDAV transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("WebDAV {method} {path} answered {status}")]
    Status {
        method: String,
        path: String,
        status: StatusCode,
    },
}

impl Error {
    /// Create a Status error from a finished request.
    pub fn status(method: &Method, path: &str, status: StatusCode) -> Self {
        Error::Status {
            method: method.to_string(),
            path: path.to_string(),
            status,
        }
    }
}
