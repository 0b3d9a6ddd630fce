//! Error types for entdef

use std::fmt;
use thiserror::Error;

/// The main error type for entity definition operations
#[derive(Debug, Error)]
pub enum EntdefError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported format version {found} (this build reads up to version {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Truncated file: header declares {declared} bytes, only {available} available")]
    TruncatedFile { declared: usize, available: usize },

    #[error("Data integrity error at {path}: {message}")]
    DataIntegrity { path: String, message: String },

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Invalid id: {0:?}")]
    InvalidId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid reorder: {0}")]
    InvalidReorder(String),

    #[error("Hitbox '{0}' is not a custom hitbox")]
    NotCustomHitbox(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

/// Result type alias for entdef operations
pub type Result<T> = std::result::Result<T, EntdefError>;

/// Payload-free tag identifying which kind of failure occurred
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidFormat,
    UnsupportedVersion,
    TruncatedFile,
    DataIntegrity,
    DuplicateId,
    InvalidId,
    NotFound,
    InvalidBounds,
    InvalidReorder,
    NotCustomHitbox,
    Io,
    Json,
}

impl EntdefError {
    /// Shorthand for a `DataIntegrity` error at a field path
    pub fn integrity(path: impl Into<String>, message: impl Into<String>) -> Self {
        EntdefError::DataIntegrity {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EntdefError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            EntdefError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            EntdefError::TruncatedFile { .. } => ErrorKind::TruncatedFile,
            EntdefError::DataIntegrity { .. } => ErrorKind::DataIntegrity,
            EntdefError::DuplicateId(_) => ErrorKind::DuplicateId,
            EntdefError::InvalidId(_) => ErrorKind::InvalidId,
            EntdefError::NotFound(_) => ErrorKind::NotFound,
            EntdefError::InvalidBounds(_) => ErrorKind::InvalidBounds,
            EntdefError::InvalidReorder(_) => ErrorKind::InvalidReorder,
            EntdefError::NotCustomHitbox(_) => ErrorKind::NotCustomHitbox,
            EntdefError::Io(_) => ErrorKind::Io,
            EntdefError::Json(_) => ErrorKind::Json,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidFormat => "invalid_format",
            ErrorKind::UnsupportedVersion => "unsupported_version",
            ErrorKind::TruncatedFile => "truncated_file",
            ErrorKind::DataIntegrity => "data_integrity",
            ErrorKind::DuplicateId => "duplicate_id",
            ErrorKind::InvalidId => "invalid_id",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidBounds => "invalid_bounds",
            ErrorKind::InvalidReorder => "invalid_reorder",
            ErrorKind::NotCustomHitbox => "not_custom_hitbox",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
        };
        f.write_str(name)
    }
}

impl From<serde_json::Error> for EntdefError {
    fn from(err: serde_json::Error) -> Self {
        EntdefError::Json(err.to_string())
    }
}
