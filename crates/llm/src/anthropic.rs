//! Anthropic Claude Provider
//!
//! Implementation of the GenerationClient trait for Anthropic's Messages API.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::http_client::build_http_client;
use super::provider::{missing_api_key_error, parse_http_error, GenerationClient};
use super::types::{CompletionRequest, LlmError, LlmResult, ProviderConfig};

/// Default Anthropic API endpoint
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Current API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider
pub struct AnthropicProvider {
    config: ProviderConfig,
    endpoint: Url,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let raw = config.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL);
        let endpoint = Url::parse(raw).map_err(|e| LlmError::InvalidRequest {
            message: format!("invalid base URL '{}': {}", raw, e),
        })?;
        let client = build_http_client(config.timeout_secs)?;
        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    /// Build the request body for the API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature.unwrap_or(self.config.temperature),
            "messages": [{
                "role": "user",
                "content": [{ "type": "text", "text": request.user_prompt }]
            }],
        });

        if !request.system_prompt.is_empty() {
            body["system"] = serde_json::json!(request.system_prompt);
        }

        body
    }

    /// Concatenate the text blocks of a response
    fn parse_response(&self, response: &ClaudeResponse) -> LlmResult<String> {
        let text: String = response
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect();

        tracing::debug!(
            model = %response.model,
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "anthropic completion received"
        );

        if response.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!(model = %response.model, "completion truncated at max_tokens");
        }

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl GenerationClient for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn create_completion(&self, request: CompletionRequest) -> LlmResult<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("anthropic"))?;

        let body = self.build_request_body(&request);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, "anthropic"));
        }

        let claude_response: ClaudeResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        self.parse_response(&claude_response)
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: ClaudeUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
struct ClaudeUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}
