//! OpenAI provider wire format tests.

use serde_json::json;

use outreach::providers::openai::{build_request, parse_response};
use outreach::providers::{CompletionRequest, Message, ProviderError, StopReason};

#[test]
fn build_request_prepends_system_message() {
    let request = CompletionRequest {
        messages: vec![Message::user("Refine this")],
        system: Some("Be concise.".to_owned()),
        max_tokens: None,
        temperature: Some(0.2),
    };
    let req = build_request("gpt-4o", &request);
    assert_eq!(req.model, "gpt-4o");
    assert_eq!(req.messages.len(), 2);
    assert_eq!(req.messages[0].role, "system");
    assert_eq!(req.messages[0].content, "Be concise.");
    assert_eq!(req.messages[1].role, "user");
    assert_eq!(req.max_tokens, Some(4096));
    assert_eq!(req.temperature, Some(0.2));
}

#[test]
fn parse_response_reads_first_choice() {
    let body = json!({
        "choices": [{"message": {"content": "Refined"}, "finish_reason": "length"}],
        "model": "gpt-4o-2024-08-06",
        "usage": {"prompt_tokens": 11, "completion_tokens": 7}
    });
    let resp = parse_response(&body.to_string()).expect("should parse");
    assert_eq!(resp.text, "Refined");
    assert_eq!(resp.stop_reason, StopReason::MaxTokens);
    assert_eq!(resp.usage.input_tokens, 11);
    assert_eq!(resp.usage.output_tokens, 7);
    assert_eq!(resp.model, "gpt-4o-2024-08-06");
}

#[test]
fn parse_response_null_content_is_empty_text() {
    let body = json!({
        "choices": [{"message": {"content": null}, "finish_reason": "content_filter"}],
        "model": "gpt-4o"
    });
    let resp = parse_response(&body.to_string()).expect("should parse");
    assert!(resp.text.is_empty());
    assert_eq!(resp.stop_reason, StopReason::StopSequence);
}

#[test]
fn parse_response_without_choices_is_error() {
    let body = json!({"choices": [], "model": "gpt-4o"});
    let result = parse_response(&body.to_string());
    assert!(matches!(result, Err(ProviderError::Parse(msg)) if msg.contains("choices")));
}
