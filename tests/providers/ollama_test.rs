//! Ollama provider wire format tests.

use serde_json::json;

use outreach::providers::ollama::{
    build_request, parse_response, OllamaProvider, DEFAULT_OLLAMA_URL,
};
use outreach::providers::{CompletionRequest, LlmProvider, Message, StopReason};

use crate::http_response_test::serve_once;

fn simple_request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::user("Hello")],
        system: Some("You are helpful.".to_owned()),
        max_tokens: Some(512),
        temperature: Some(0.7),
    }
}

#[test]
fn build_request_injects_system_message() {
    let req = build_request("qwen3:8b", &simple_request());
    assert_eq!(req.model, "qwen3:8b");
    assert!(!req.stream);
    assert_eq!(req.messages.len(), 2);
    assert_eq!(req.messages[0].role, "system");
    assert_eq!(req.messages[0].content, "You are helpful.");
    assert_eq!(req.messages[1].role, "user");
}

#[test]
fn build_request_sets_options() {
    let req = build_request("model", &simple_request());
    let opts = req.options.expect("options should exist");
    assert_eq!(opts.num_predict, Some(512));
    assert_eq!(opts.temperature, Some(0.7));
}

#[test]
fn build_request_omits_empty_options() {
    let request = CompletionRequest {
        messages: vec![Message::user("hi")],
        system: None,
        max_tokens: None,
        temperature: None,
    };
    let req = build_request("model", &request);
    assert!(req.options.is_none());
    assert_eq!(req.messages.len(), 1);
}

#[test]
fn parse_response_reads_message() {
    let body = json!({
        "model": "llama3",
        "message": {"role": "assistant", "content": "Refined"},
        "done": true,
        "done_reason": "stop",
        "prompt_eval_count": 40,
        "eval_count": 12
    });
    let resp = parse_response(&body.to_string()).expect("should parse");
    assert_eq!(resp.text, "Refined");
    assert_eq!(resp.stop_reason, StopReason::EndTurn);
    assert_eq!(resp.usage.input_tokens, 40);
    assert_eq!(resp.usage.output_tokens, 12);
}

#[test]
fn provider_defaults_to_local_daemon() {
    let provider = OllamaProvider::new("ollama/llama3".to_owned(), "llama3".to_owned());
    assert_eq!(provider.base_url, DEFAULT_OLLAMA_URL);
    assert_eq!(provider.model, "llama3");
    assert_eq!(provider.model_id(), "ollama/llama3");
}

#[tokio::test]
async fn complete_posts_to_chat_endpoint() {
    let body = json!({
        "model": "llama3",
        "message": {"role": "assistant", "content": "Polished"},
        "done_reason": "length"
    });
    let url = serve_once("200 OK", "application/json", &body.to_string()).await;
    let provider =
        OllamaProvider::new("ollama/llama3".to_owned(), "llama3".to_owned()).with_base_url(url);

    let resp = provider.complete(simple_request()).await.expect("completion");
    assert_eq!(resp.text, "Polished");
    assert_eq!(resp.stop_reason, StopReason::MaxTokens);
}
