//! HTTP Client Factory
//!
//! Builds the `reqwest` client shared by HTTP-backed providers.

use std::time::Duration;

use crate::types::{LlmError, LlmResult};

const USER_AGENT: &str = concat!("call-analyzer/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` with an optional request timeout.
///
/// - `Some(secs)` -> every request times out after `secs` seconds
/// - `None` -> no client-side timeout
pub fn build_http_client(timeout_secs: Option<u64>) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().map_err(|e| LlmError::Other {
        message: format!("failed to build HTTP client: {}", e),
    })
}
