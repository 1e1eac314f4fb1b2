//! Ordered provider chain built from `[refinement].providers`.
//!
//! The chain order is the fallback order: the first spec is the primary
//! provider and every later spec is only consulted when all earlier ones
//! failed for a request.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::RefinementConfig;
use crate::credentials::Credentials;

use super::anthropic::AnthropicProvider;
use super::gemini::GeminiProvider;
use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;
use super::{parse_provider_string, LlmProvider};

/// Provider chain construction errors.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Model spec is not in `<provider>/<model>` format.
    #[error("invalid model spec '{spec}', expected '<provider>/<model>'")]
    InvalidModelSpec {
        /// Invalid raw spec.
        spec: String,
    },
    /// Unsupported provider type in spec prefix.
    #[error("unsupported provider '{provider}'")]
    UnsupportedProvider {
        /// Unsupported provider prefix.
        provider: String,
    },
    /// Required API credential missing for selected provider.
    #[error("missing credential for provider '{provider}': {key}")]
    MissingCredential {
        /// Provider name.
        provider: String,
        /// Missing credential key.
        key: String,
    },
}

/// Build the ordered provider chain from refinement config and credentials.
///
/// Providers whose credential is missing are skipped with a warning so a
/// partially configured host still refines with what it has. An empty chain
/// is valid: drafts are then returned unrefined.
///
/// # Errors
///
/// Returns an error for malformed specs or unknown provider prefixes.
pub fn build_providers(
    config: &RefinementConfig,
    credentials: &Credentials,
) -> Result<Vec<Arc<dyn LlmProvider>>, ChainError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let mut chain: Vec<Arc<dyn LlmProvider>> = Vec::with_capacity(config.providers.len());

    for spec in &config.providers {
        let (provider, model) =
            parse_provider_string(spec).map_err(|_| ChainError::InvalidModelSpec {
                spec: spec.clone(),
            })?;
        match instantiate_provider(spec, provider, model, credentials, timeout) {
            Ok(instance) => chain.push(instance),
            Err(err @ ChainError::MissingCredential { .. }) => {
                warn!(spec = %spec, error = %err, "skipping refinement provider");
            }
            Err(err) => return Err(err),
        }
    }

    if chain.is_empty() {
        warn!("no refinement providers available, drafts will be returned unrefined");
    } else {
        info!(
            providers = ?chain.iter().map(|p| p.model_id()).collect::<Vec<_>>(),
            "refinement provider chain ready"
        );
    }

    Ok(chain)
}

fn instantiate_provider(
    model_spec: &str,
    provider: &str,
    model: &str,
    credentials: &Credentials,
    timeout: Duration,
) -> Result<Arc<dyn LlmProvider>, ChainError> {
    let require = |key: &str| {
        credentials
            .get(key)
            .map(str::to_owned)
            .ok_or_else(|| ChainError::MissingCredential {
                provider: provider.to_owned(),
                key: key.to_owned(),
            })
    };

    match provider {
        "anthropic" => Ok(Arc::new(
            AnthropicProvider::new(
                model_spec.to_owned(),
                model.to_owned(),
                require("ANTHROPIC_API_KEY")?,
            )
            .with_timeout(timeout),
        )),
        "gemini" => Ok(Arc::new(
            GeminiProvider::new(
                model_spec.to_owned(),
                model.to_owned(),
                require("GOOGLE_API_KEY")?,
            )
            .with_timeout(timeout),
        )),
        "openai" => Ok(Arc::new(
            OpenAiProvider::new(
                model_spec.to_owned(),
                model.to_owned(),
                require("OPENAI_API_KEY")?,
            )
            .with_timeout(timeout),
        )),
        "ollama" => Ok(Arc::new(
            OllamaProvider::new(model_spec.to_owned(), model.to_owned()).with_timeout(timeout),
        )),
        _ => Err(ChainError::UnsupportedProvider {
            provider: provider.to_owned(),
        }),
    }
}
