//! Domain errors for the costguard library.

use thiserror::Error;

/// Domain-level errors that can occur in costguard.
///
/// The cache and limiter hot paths never surface these to callers; they
/// appear at the edges (typed tier parsing, payload serialization, sink
/// adapters).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown subscription tier: {0}")]
    UnknownTier(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Usage sink error: {0}")]
    SinkError(String),
}

/// Convenience alias for domain-level results.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
