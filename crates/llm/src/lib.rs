//! Call Analyzer LLM
//!
//! Provides the `GenerationClient` capability contract used by the analysis
//! engine, together with:
//! - Anthropic Claude (Messages API)
//!
//! Also includes the HTTP client factory shared by HTTP-backed providers.

pub mod anthropic;
pub mod http_client;
pub mod provider;
pub mod types;

// Re-export main types
pub use anthropic::AnthropicProvider;
pub use http_client::build_http_client;
pub use provider::GenerationClient;
pub use types::*;
