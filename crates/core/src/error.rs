//! Core Error Types
//!
//! Defines the foundational error types shared by every crate in the Call
//! Analyzer workspace. Higher-level crates wrap these in their own error
//! enums (`LlmError`, `AnalysisError`) where they need richer variants.

use thiserror::Error;

/// Core error type for the Call Analyzer workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors (unknown call, missing transcript, ...)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream data provider errors
    #[error("Provider error: {0}")]
    Provider(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::config("missing api key");
        assert_eq!(err.to_string(), "Configuration error: missing api key");
    }

    #[test]
    fn test_provider_error_display() {
        let err = CoreError::provider("gong unavailable");
        assert_eq!(err.to_string(), "Provider error: gong unavailable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
    }

    #[test]
    fn test_not_found_error() {
        let err = CoreError::not_found("call c-404");
        assert_eq!(err.to_string(), "Not found: call c-404");
    }
}
