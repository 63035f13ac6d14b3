//! Analysis Error Types
//!
//! Failures of a single (call, framework) pair, plus request validation.
//! Only `Validation` and `UnknownFramework` reach the caller of the batch
//! entry point; every other variant is folded into an error record.

use call_analyzer_core::CoreError;
use call_analyzer_llm::LlmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Malformed top-level request
    #[error("Invalid analysis request: {0}")]
    Validation(String),

    /// Call metadata or transcript unavailable
    #[error("Failed to fetch call {call_id}: {source}")]
    Fetch {
        call_id: String,
        #[source]
        source: CoreError,
    },

    /// The generation call itself failed
    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    /// No recovery tier produced a usable analysis
    #[error("Model response could not be parsed into a valid analysis")]
    RecoveryExhausted,

    #[error("Unknown framework: {0}")]
    UnknownFramework(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn fetch(call_id: impl Into<String>, source: CoreError) -> Self {
        Self::Fetch {
            call_id: call_id.into(),
            source,
        }
    }

    /// Short reason string stored on an error record.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
