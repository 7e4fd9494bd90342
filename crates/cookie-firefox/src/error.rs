//! Error types for cookie-firefox

use std::path::PathBuf;

/// Result type for cookie-firefox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating profiles or touching the
/// permission database
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Rule error: {0}")]
    Model(#[from] cookie_model::Error),

    #[error("Permission database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No Firefox profiles file at {path}")]
    ProfilesIniNotFound { path: PathBuf },

    #[error("Malformed profile section [{section}]: missing {key}")]
    MalformedProfile { section: String, key: String },

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("Profile directory not found: {path}")]
    ProfileDirNotFound { path: PathBuf },

    #[error("No default profile found; select one by name or path")]
    NoDefaultProfile,

    #[error("More than one profile is marked as default; select one by name or path")]
    AmbiguousDefaultProfile,

    #[error("No permission database at {path}")]
    PermissionDbNotFound { path: PathBuf },

    #[error("Could not determine the home directory")]
    NoHomeDirectory,
}

impl Error {
    /// Create an Io error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
