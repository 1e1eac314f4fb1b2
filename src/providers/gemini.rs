//! Google Gemini provider implementation using the `generateContent` API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{
    check_http_response, http_client, CompletionRequest, CompletionResponse, LlmProvider,
    ProviderError, Role, StopReason, UsageStats, DEFAULT_TIMEOUT,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Gemini `generateContent` request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation turns.
    pub contents: Vec<GeminiContent>,
    /// Optional system instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    /// Generation settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

/// A turn in Gemini format.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Role: "user" or "model". Absent on system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A content part in Gemini format.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// Text of the part; non-text parts carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Gemini generation settings.
#[doc(hidden)]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    /// Maximum output tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Gemini `generateContent` response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Response candidates.
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Token usage.
    pub usage_metadata: Option<GeminiUsage>,
    /// Exact model version that served the request.
    pub model_version: Option<String>,
}

/// A response candidate.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Candidate content.
    pub content: Option<GeminiContent>,
    /// Why generation finished, e.g. `"STOP"` or `"MAX_TOKENS"`.
    pub finish_reason: Option<String>,
}

/// Gemini usage metadata.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsage {
    /// Prompt token count.
    pub prompt_token_count: Option<u32>,
    /// Candidate token count.
    pub candidates_token_count: Option<u32>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Google Gemini API provider.
#[derive(Clone)]
pub struct GeminiProvider {
    model_spec: String,
    model_name: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model_spec", &self.model_spec)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider instance.
    pub fn new(model_spec: String, model_name: String, api_key: String) -> Self {
        Self {
            model_spec,
            model_name,
            api_key,
            base_url: GEMINI_API_BASE.to_owned(),
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

/// Build a Gemini API request from a completion request.
#[doc(hidden)]
pub fn build_request(request: &CompletionRequest) -> GeminiRequest {
    let contents = request
        .messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::System | Role::User => "user",
                Role::Assistant => "model",
            };
            GeminiContent {
                role: Some(role.to_owned()),
                parts: vec![GeminiPart {
                    text: Some(msg.content.clone()),
                }],
            }
        })
        .collect();

    let system_instruction = request.system.as_ref().map(|system| GeminiContent {
        role: None,
        parts: vec![GeminiPart {
            text: Some(system.clone()),
        }],
    });

    let generation_config = if request.max_tokens.is_some() || request.temperature.is_some() {
        Some(GeminiGenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
        })
    } else {
        None
    };

    GeminiRequest {
        contents,
        system_instruction,
        generation_config,
    }
}

/// Parse a Gemini API response into a completion response.
///
/// `fallback_model` names the model when the response omits `modelVersion`.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body cannot be deserialized or has
/// no candidates (Gemini returns none when the prompt itself is blocked).
#[doc(hidden)]
pub fn parse_response(body: &str, fallback_model: &str) -> Result<CompletionResponse, ProviderError> {
    let resp: GeminiResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("missing candidates[0]".to_owned()))?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let stop_reason = match candidate.finish_reason.as_deref() {
        Some("STOP") | None => StopReason::EndTurn,
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY") | Some("RECITATION") => StopReason::StopSequence,
        Some(other) => StopReason::Other(other.to_owned()),
    };

    let usage = UsageStats {
        input_tokens: resp
            .usage_metadata
            .as_ref()
            .and_then(|u| u.prompt_token_count)
            .unwrap_or(0),
        output_tokens: resp
            .usage_metadata
            .as_ref()
            .and_then(|u| u.candidates_token_count)
            .unwrap_or(0),
    };

    Ok(CompletionResponse {
        text,
        stop_reason,
        usage,
        model: resp
            .model_version
            .unwrap_or_else(|| fallback_model.to_owned()),
    })
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_request = build_request(&request);

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        );
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload, &self.model_name)
    }

    fn model_id(&self) -> &str {
        &self.model_spec
    }
}
