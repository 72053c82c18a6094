//! Error types for the lightweight_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lightweight_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A logged set was rejected before anything was written
    #[error("Invalid set: {0}")]
    Validation(String),

    /// An import payload did not have the expected shape
    #[error("Invalid import format: {0}")]
    Format(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the caller can fix its input and retry.
    ///
    /// Validation and format failures never leave partial state behind, so a
    /// presentation layer can simply re-prompt.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Format(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::Validation("reps".into()).is_recoverable());
        assert!(Error::Format("not an array".into()).is_recoverable());
        assert!(!Error::Other("boom".into()).is_recoverable());
        assert!(!Error::Io(io::Error::new(io::ErrorKind::Other, "disk")).is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::Validation("weight must be positive".into());
        assert_eq!(err.to_string(), "Invalid set: weight must be positive");
    }
}
