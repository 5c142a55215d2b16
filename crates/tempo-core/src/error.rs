//! Error types for the Tempo application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Tempo application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum TempoError {
    /// Malformed session parameters (e.g., non-positive duration).
    /// Rejected at the session store boundary, never retried automatically.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller identity missing or invalid. Surfaced to the caller, no retry.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Referenced entity does not exist at the store.
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Store unreachable or request timed out. Recoverable by retrying the
    /// identical operation (idempotent for `end`, not for `start`).
    #[error("Transient failure: {0}")]
    Transient(String),

    /// History snapshot failed to persist after a successful completion.
    /// The session is still correctly completed at the store; this is a
    /// non-fatal warning, never rolled back.
    #[error("History write failed: {0}")]
    HistoryWrite(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TempoError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Transient error
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// Creates a HistoryWrite error
    pub fn history_write(message: impl Into<String>) -> Self {
        Self::HistoryWrite(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an InvalidInput error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this is an Unauthorized error
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Check if this is a HistoryWrite error
    pub fn is_history_write(&self) -> bool {
        matches!(self, Self::HistoryWrite(_))
    }

    /// Check if this error is worth retrying with the identical operation.
    ///
    /// Returns true for:
    /// - `Transient` errors (store unreachable, request timed out)
    /// - `Io` errors (the directory-backed store behaves like an
    ///   intermittently available remote)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Io { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TempoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TempoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TempoError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TempoError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from String (for error messages)
impl From<String> for TempoError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, TempoError>`.
pub type Result<T> = std::result::Result<T, TempoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_constructor_and_predicate() {
        let err = TempoError::not_found("session", "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: session 'abc'");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(TempoError::transient("store unreachable").is_retryable());
        assert!(TempoError::io("disk error").is_retryable());
        assert!(!TempoError::invalid_input("duration must be positive").is_retryable());
        assert!(!TempoError::not_found("session", "x").is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TempoError = io.into();
        assert!(matches!(err, TempoError::Io { .. }));
    }
}
