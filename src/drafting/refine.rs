//! Generative polishing of a rendered draft with ordered provider fallback.
//!
//! Providers are tried strictly one after another in configured order. The
//! first usable answer wins; a provider error, an empty answer, or (with fact
//! verification on) an answer that dropped one of the draft's facts moves on
//! to the next provider. When the chain runs out the rendered draft is
//! returned untouched, so refinement can never fail a request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::RefinementConfig;
use crate::credentials::Credentials;
use crate::providers::chain::{build_providers, ChainError};
use crate::providers::{CompletionRequest, LlmProvider, Message, ProviderError};
use crate::store::ThreadHistory;

use super::analyzer::SentimentAnalysis;
use super::strategy::Strategy;

/// Messages of history shown to the provider.
pub const CONTEXT_MESSAGES: usize = 5;

/// Characters of each history message shown to the provider.
pub const CONTEXT_BODY_CHARS: usize = 200;

/// Standing instruction sent with every refinement call.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant helping refine professional messages for doctors applying to medical practices.

The message should:
- Be professional and clear
- Clearly indicate it's written \"on behalf of\" the doctor
- Match the tone based on previous interactions (rapport vs formal)
- Learn from successful past messages and adapt tone accordingly
- Include all necessary details (session ID, date, times, pricing)

Refine the draft message to ensure it's polished and professional, using the message history context to match the appropriate tone.";

/// A generative text backend that can polish a draft.
#[async_trait]
pub trait RefinementProvider: Send + Sync {
    /// Stable identifier, reported as `refined_by`.
    fn id(&self) -> &str;

    /// Produce refined text from a system and a user instruction.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on any transport or provider failure.
    async fn refine(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

/// [`RefinementProvider`] over any [`LlmProvider`].
pub struct LlmRefiner {
    provider: Arc<dyn LlmProvider>,
    max_tokens: u32,
    temperature: f32,
}

impl LlmRefiner {
    /// Wrap a provider with the sampling settings used for every call.
    pub fn new(provider: Arc<dyn LlmProvider>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            provider,
            max_tokens,
            temperature,
        }
    }
}

impl std::fmt::Debug for LlmRefiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmRefiner")
            .field("provider", &self.provider.model_id())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[async_trait]
impl RefinementProvider for LlmRefiner {
    fn id(&self) -> &str {
        self.provider.model_id()
    }

    async fn refine(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            messages: vec![Message::user(user)],
            system: Some(system.to_owned()),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };
        let response = self.provider.complete(request).await?;
        debug!(
            provider = self.provider.model_id(),
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "refinement completion received"
        );
        Ok(response.text)
    }
}

/// Everything the orchestrator needs to refine one draft.
#[derive(Debug, Clone, Copy)]
pub struct RefinementInput<'a> {
    /// Rendered template text.
    pub draft: &'a str,
    /// Strategy the draft was rendered with.
    pub strategy: Strategy,
    /// History classification.
    pub analysis: &'a SentimentAnalysis,
    /// Thread history, for tone context.
    pub history: &'a ThreadHistory,
    /// Values that must appear verbatim in the refined text.
    pub facts: &'a [String],
}

/// Final text of a draft and who produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementOutcome {
    /// Draft text to return.
    pub text: String,
    /// Provider whose output was used; `None` for the unrefined draft.
    pub refined_by: Option<String>,
}

impl RefinementOutcome {
    fn unrefined(draft: &str) -> Self {
        Self {
            text: draft.to_owned(),
            refined_by: None,
        }
    }
}

/// Sequential-fallback refinement over an ordered provider list.
pub struct RefinementOrchestrator {
    providers: Vec<Arc<dyn RefinementProvider>>,
    verify_facts: bool,
}

impl std::fmt::Debug for RefinementOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefinementOrchestrator")
            .field("providers", &self.provider_ids())
            .field("verify_facts", &self.verify_facts)
            .finish()
    }
}

impl RefinementOrchestrator {
    /// Orchestrator over providers in fallback order, fact checking on.
    pub fn new(providers: Vec<Arc<dyn RefinementProvider>>) -> Self {
        Self {
            providers,
            verify_facts: true,
        }
    }

    /// Orchestrator that always returns the rendered draft.
    pub fn disabled() -> Self {
        Self::new(Vec::new())
    }

    /// Toggle rejection of refined text that lost a fact.
    #[must_use]
    pub fn with_fact_check(mut self, verify_facts: bool) -> Self {
        self.verify_facts = verify_facts;
        self
    }

    /// Build the chain described by `[refinement]`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] for malformed or unsupported provider specs.
    pub fn from_config(
        config: &RefinementConfig,
        credentials: &Credentials,
    ) -> Result<Self, ChainError> {
        if !config.enabled {
            info!("refinement disabled, drafts will be returned unrefined");
            return Ok(Self::disabled().with_fact_check(config.verify_facts));
        }
        let providers = build_providers(config, credentials)?
            .into_iter()
            .map(|provider| {
                Arc::new(LlmRefiner::new(
                    provider,
                    config.max_tokens,
                    config.temperature,
                )) as Arc<dyn RefinementProvider>
            })
            .collect();
        Ok(Self::new(providers).with_fact_check(config.verify_facts))
    }

    /// Provider ids in fallback order.
    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Refine a draft, falling back to it unchanged when no provider
    /// produces a usable answer.
    pub async fn refine(&self, input: &RefinementInput<'_>) -> RefinementOutcome {
        if self.providers.is_empty() {
            debug!("no refinement providers configured");
            return RefinementOutcome::unrefined(input.draft);
        }

        let user_prompt = build_user_prompt(input);
        for provider in &self.providers {
            let text = match provider.refine(SYSTEM_PROMPT, &user_prompt).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(provider = provider.id(), error = %err, "refinement provider failed");
                    continue;
                }
            };

            let text = text.trim();
            if text.is_empty() {
                warn!(provider = provider.id(), "refinement provider returned empty text");
                continue;
            }

            if self.verify_facts {
                if let Some(missing) = input.facts.iter().find(|fact| !text.contains(fact.as_str()))
                {
                    warn!(
                        provider = provider.id(),
                        missing = %missing,
                        "refined text dropped a fact, discarding"
                    );
                    continue;
                }
            }

            info!(provider = provider.id(), strategy = %input.strategy, "draft refined");
            return RefinementOutcome {
                text: text.to_owned(),
                refined_by: Some(provider.id().to_owned()),
            };
        }

        warn!(
            attempted = self.providers.len(),
            "all refinement providers failed, returning rendered draft"
        );
        RefinementOutcome::unrefined(input.draft)
    }
}

/// User instruction for one refinement call.
pub fn build_user_prompt(input: &RefinementInput<'_>) -> String {
    let analysis = serde_json::to_string(input.analysis).unwrap_or_default();
    let context = build_history_context(input.history);
    format!(
        "Please review and refine this draft message. Only make minor improvements - don't change the structure or key information:\n\n\
         Template used: {strategy}\n\
         Sentiment analysis: {analysis}\n\
         {context}\n\n\
         Draft message:\n\
         {draft}\n\n\
         Return only the refined message, nothing else.",
        strategy = input.strategy,
        draft = input.draft,
    )
}

/// Tone context: the latest messages labelled by sender, or a first-time
/// application note.
pub fn build_history_context(history: &ThreadHistory) -> String {
    if history.messages.is_empty() {
        return "\n\nThis is a first-time application (no previous message history).".to_owned();
    }

    let mut context = String::from("\n\nPrevious Message History (for context):\n");
    let skip = history.messages.len().saturating_sub(CONTEXT_MESSAGES);
    for message in history.messages.iter().skip(skip) {
        let sender = if history.is_from_doctor(message) {
            "Doctor"
        } else {
            "Practice"
        };
        context.push('\n');
        context.push_str(sender);
        context.push_str(": ");
        context.push_str(&truncate_body(&message.body));
        context.push('\n');
    }
    context
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() > CONTEXT_BODY_CHARS {
        let head: String = body.chars().take(CONTEXT_BODY_CHARS).collect();
        format!("{head}...")
    } else {
        body.to_owned()
    }
}
