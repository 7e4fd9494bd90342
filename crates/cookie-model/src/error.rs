//! Error types for cookie-model

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown permission code {code} (expected 1 or 8)")]
    UnknownPermissionCode { code: i64 },

    #[error("Unknown permission name: {name}")]
    UnknownPermissionName { name: String },

    #[error("Invalid rule for {origin}: {reason}")]
    InvalidRule { origin: String, reason: String },

    #[error("Duplicate origin in snapshot: {origin}")]
    DuplicateOrigin { origin: String },

    #[error("Timestamp out of range: {millis} ms since epoch")]
    TimestampOutOfRange { millis: i64 },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
