//! Generation Client Trait
//!
//! Defines the common interface for text-generation providers.

use async_trait::async_trait;

use super::types::{CompletionRequest, LlmError, LlmResult};

/// Trait that all generation providers must implement.
///
/// The analysis engine only needs raw completion text; parsing and repair of
/// that text happen downstream.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Send a prompt pair and return the model's raw text output.
    async fn create_completion(&self, request: CompletionRequest) -> LlmResult<String>;
}

/// Helper function to create an error for missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper function to parse HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::ModelNotFound {
            model: body.to_string(),
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
            retry_after: None,
        },
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}
