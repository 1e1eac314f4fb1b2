//! Provider chain construction tests.

use std::collections::BTreeMap;

use outreach::config::RefinementConfig;
use outreach::credentials::Credentials;
use outreach::providers::chain::{build_providers, ChainError};
use outreach::providers::parse_provider_string;

fn credentials(pairs: &[(&str, &str)]) -> Credentials {
    Credentials::from_map(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn config(providers: &[&str]) -> RefinementConfig {
    RefinementConfig {
        providers: providers.iter().map(|p| (*p).to_owned()).collect(),
        ..RefinementConfig::default()
    }
}

#[test]
fn chain_preserves_configured_order() {
    let creds = credentials(&[
        ("GOOGLE_API_KEY", "g-key"),
        ("OPENAI_API_KEY", "o-key"),
        ("ANTHROPIC_API_KEY", "a-key"),
    ]);
    let chain = build_providers(
        &config(&[
            "gemini/gemini-2.5-pro",
            "openai/gpt-4o",
            "anthropic/claude-sonnet",
            "ollama/llama3",
        ]),
        &creds,
    )
    .expect("chain should build");

    let ids: Vec<&str> = chain.iter().map(|p| p.model_id()).collect();
    assert_eq!(
        ids,
        vec![
            "gemini/gemini-2.5-pro",
            "openai/gpt-4o",
            "anthropic/claude-sonnet",
            "ollama/llama3"
        ]
    );
}

#[test]
fn missing_credential_skips_provider() {
    let creds = credentials(&[("OPENAI_API_KEY", "o-key"), ("GOOGLE_API_KEY", "  ")]);
    let chain = build_providers(&config(&["gemini/gemini-2.5-pro", "openai/gpt-4o"]), &creds)
        .expect("chain should build");
    let ids: Vec<&str> = chain.iter().map(|p| p.model_id()).collect();
    assert_eq!(ids, vec!["openai/gpt-4o"]);
}

#[test]
fn empty_chain_is_allowed() {
    let chain = build_providers(&config(&["gemini/gemini-2.5-pro"]), &Credentials::default())
        .expect("chain should build");
    assert!(chain.is_empty());
}

#[test]
fn malformed_spec_is_rejected() {
    let result = build_providers(&config(&["gemini"]), &Credentials::default());
    assert!(matches!(result, Err(ChainError::InvalidModelSpec { spec }) if spec == "gemini"));
}

#[test]
fn unknown_provider_is_rejected() {
    let result = build_providers(&config(&["mistral/large"]), &Credentials::default());
    assert!(matches!(
        result,
        Err(ChainError::UnsupportedProvider { provider }) if provider == "mistral"
    ));
}

#[test]
fn provider_string_splits_on_first_slash() {
    let parsed = parse_provider_string("ollama/library/llama3").expect("should parse");
    assert_eq!(parsed, ("ollama", "library/llama3"));
    assert!(parse_provider_string("/model").is_err());
    assert!(parse_provider_string("gemini/").is_err());
}

#[test]
fn default_chain_has_a_fallback() {
    let creds = credentials(&[("GOOGLE_API_KEY", "g-key")]);
    let chain = build_providers(&RefinementConfig::default(), &creds).expect("chain should build");
    let ids: Vec<&str> = chain.iter().map(|p| p.model_id()).collect();
    assert_eq!(ids, vec!["gemini/gemini-2.5-pro", "gemini/gemini-2.5-flash"]);
}
