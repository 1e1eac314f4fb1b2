//! Anthropic provider wire format tests.

use serde_json::json;

use outreach::providers::anthropic::{build_request, parse_response, AnthropicProvider};
use outreach::providers::{CompletionRequest, LlmProvider, Message, Role, StopReason};

use crate::http_response_test::serve_once;

fn simple_request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::user("Hello")],
        system: Some("You are helpful.".to_owned()),
        max_tokens: Some(1024),
        temperature: Some(0.7),
    }
}

#[test]
fn build_request_sets_model_and_system() {
    let req = build_request("claude-sonnet", &simple_request());
    assert_eq!(req.model, "claude-sonnet");
    assert_eq!(req.system, Some("You are helpful.".to_owned()));
    assert_eq!(req.max_tokens, 1024);
    assert_eq!(req.temperature, Some(0.7));
}

#[test]
fn build_request_maps_roles_correctly() {
    let request = CompletionRequest {
        messages: vec![
            Message::user("hi"),
            Message {
                role: Role::Assistant,
                content: "hello".to_owned(),
            },
            Message {
                role: Role::System,
                content: "note".to_owned(),
            },
        ],
        system: None,
        max_tokens: None,
        temperature: None,
    };
    let req = build_request("model", &request);
    assert_eq!(req.messages[0].role, "user");
    assert_eq!(req.messages[1].role, "assistant");
    assert_eq!(req.messages[2].role, "user"); // System maps to user
}

#[test]
fn build_request_default_max_tokens() {
    let mut request = simple_request();
    request.max_tokens = None;
    let req = build_request("model", &request);
    assert_eq!(req.max_tokens, 4096);
}

#[test]
fn parse_response_joins_text_blocks() {
    let body = json!({
        "content": [
            {"type": "text", "text": "Hello "},
            {"type": "thinking", "thinking": "..."},
            {"type": "text", "text": "world"}
        ],
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 10, "output_tokens": 5}
    });
    let resp = parse_response(&body.to_string()).expect("should parse");
    assert_eq!(resp.text, "Hello world");
    assert_eq!(resp.stop_reason, StopReason::EndTurn);
    assert_eq!(resp.usage.input_tokens, 10);
    assert_eq!(resp.usage.output_tokens, 5);
    assert_eq!(resp.model, "claude-sonnet-4-5-20250929");
}

#[test]
fn parse_response_max_tokens_stop() {
    let body = json!({
        "content": [{"type": "text", "text": "cut"}],
        "model": "m",
        "stop_reason": "max_tokens",
        "usage": {"input_tokens": 1, "output_tokens": 1}
    });
    let resp = parse_response(&body.to_string()).expect("should parse");
    assert_eq!(resp.stop_reason, StopReason::MaxTokens);
}

#[test]
fn parse_response_rejects_malformed_body() {
    assert!(parse_response("not json").is_err());
}

#[tokio::test]
async fn complete_round_trips_through_http() {
    let body = json!({
        "content": [{"type": "text", "text": "Refined"}],
        "model": "claude-sonnet",
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 3, "output_tokens": 1}
    });
    let url = serve_once("200 OK", "application/json", &body.to_string()).await;

    let provider = AnthropicProvider::new(
        "anthropic/claude-sonnet".to_owned(),
        "claude-sonnet".to_owned(),
        "sk-ant-test".to_owned(),
    )
    .with_base_url(url);

    let resp = provider.complete(simple_request()).await.expect("completion");
    assert_eq!(resp.text, "Refined");
    assert_eq!(provider.model_id(), "anthropic/claude-sonnet");
}
