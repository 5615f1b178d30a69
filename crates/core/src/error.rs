//! Error types for the recall engine.
//!
//! This module defines a unified error enum that covers every failure the
//! engine can surface: configuration, I/O, embedding, index, persistence and
//! input validation.

use thiserror::Error;

/// Unified error type for the recall workspace.
///
/// All fallible functions return `Result<T, AppError>`.
/// Sentinel outcomes (empty knowledge base, missing answer) are not errors
/// and never show up here.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The embedding capability could not be loaded or reached
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// A vector does not have the dimensionality the index was built for
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding generation failed after the model was loaded
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index errors
    #[error("Index error: {0}")]
    Index(String),

    /// Reading or writing persisted artifacts failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Caller violated a precondition
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Whether this error means the engine cannot operate at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::ModelUnavailable(_) | AppError::Config(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = AppError::DimensionMismatch {
            expected: 384,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 384, got 3");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(AppError::ModelUnavailable("down".to_string()).is_fatal());
        assert!(!AppError::InvalidInput("k".to_string()).is_fatal());
    }

    #[test]
    fn test_from_serde_json() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
