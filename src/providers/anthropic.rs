//! Anthropic provider implementation using the `/v1/messages` API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{
    check_http_response, http_client, CompletionRequest, CompletionResponse, LlmProvider,
    ProviderError, Role, StopReason, UsageStats, DEFAULT_TIMEOUT,
};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Anthropic messages API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<AnthropicMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Optional system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Optional sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A message in Anthropic format.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Text content.
    pub content: String,
}

/// Anthropic API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// Content blocks in the response.
    pub content: Vec<AnthropicContentBlock>,
    /// Model that served the response.
    pub model: String,
    /// Why the model stopped generating.
    pub stop_reason: Option<String>,
    /// Token usage.
    pub usage: AnthropicUsage,
}

/// A content block in the Anthropic response.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Any block type this client does not consume.
    #[serde(other)]
    Other,
}

/// Anthropic usage statistics.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct AnthropicUsage {
    /// Input tokens consumed.
    pub input_tokens: u32,
    /// Output tokens generated.
    pub output_tokens: u32,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Anthropic messages API provider.
#[derive(Clone)]
pub struct AnthropicProvider {
    model_spec: String,
    model_name: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("model_spec", &self.model_spec)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AnthropicProvider {
    /// Create a new Anthropic provider instance.
    pub fn new(model_spec: String, model_name: String, api_key: String) -> Self {
        Self {
            model_spec,
            model_name,
            api_key,
            base_url: ANTHROPIC_API_BASE.to_owned(),
            client: http_client(DEFAULT_TIMEOUT),
        }
    }

    /// Replace the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// Point the provider at a different API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build an Anthropic API request from a completion request.
///
/// Anthropic takes the system prompt out of band; any system-role messages in
/// the list are sent as user turns.
#[doc(hidden)]
pub fn build_request(model: &str, request: &CompletionRequest) -> AnthropicRequest {
    let messages: Vec<AnthropicMessage> = request
        .messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::System | Role::User => "user",
                Role::Assistant => "assistant",
            };
            AnthropicMessage {
                role: role.to_owned(),
                content: msg.content.clone(),
            }
        })
        .collect();

    AnthropicRequest {
        model: model.to_owned(),
        messages,
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system: request.system.clone(),
        temperature: request.temperature,
    }
}

/// Parse an Anthropic API response into a completion response.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the response cannot be deserialized.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<CompletionResponse, ProviderError> {
    let resp: AnthropicResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let text: String = resp
        .content
        .into_iter()
        .filter_map(|block| match block {
            AnthropicContentBlock::Text { text } => Some(text),
            AnthropicContentBlock::Other => None,
        })
        .collect();

    let stop_reason = match resp.stop_reason.as_deref() {
        Some("end_turn") | None => StopReason::EndTurn,
        Some("max_tokens") => StopReason::MaxTokens,
        Some("stop_sequence") => StopReason::StopSequence,
        Some(other) => StopReason::Other(other.to_owned()),
    };

    Ok(CompletionResponse {
        text,
        stop_reason,
        usage: UsageStats {
            input_tokens: resp.usage.input_tokens,
            output_tokens: resp.usage.output_tokens,
        },
        model: resp.model,
    })
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_request = build_request(&self.model_name, &request);

        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model_spec
    }
}
