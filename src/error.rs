// src/error.rs

//! Error types shared by the library
//!
//! Command handlers wrap these in `anyhow` for display; everything inside the
//! library returns [`Result`].

use thiserror::Error;

/// Library error type
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream descriptor or index text is missing required structure
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A recipe array region cannot be bounded unambiguously
    #[error("Cannot locate {field} in recipe: {reason}")]
    LocateError { field: String, reason: String },

    /// A recipe directory or file does not exist
    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Download error: {0}")]
    DownloadError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Initialization error: {0}")]
    InitError(String),
}

impl Error {
    /// Shorthand for a [`Error::LocateError`]
    pub fn locate(field: &str, reason: impl Into<String>) -> Self {
        Self::LocateError {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_error_display() {
        let err = Error::locate("depends", "array is never closed");
        assert_eq!(
            err.to_string(),
            "Cannot locate depends in recipe: array is never closed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::IoError(_)));
    }
}
