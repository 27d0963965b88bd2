#![cfg(feature = "provider-together")]

mod support;

use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::json;
use support::FakeTransport;
use uprovider::{
    ChatRequest, Feature, Message, ProviderAdapter, ProviderId, Role, SecretString, StreamEvent,
    TogetherAdapter, ToolDefinition,
};

fn request() -> ChatRequest {
    ChatRequest::new(
        ProviderId::TOGETHER,
        "meta-llama/Llama-3-8b-chat-hf",
        vec![Message::new(Role::User, "hi")],
    )
}

#[test]
fn together_declares_streaming_without_tools_or_thinking() {
    let transport = Arc::new(FakeTransport::default());
    let adapter = TogetherAdapter::new(SecretString::new("tg-key"), transport);

    let capabilities = adapter.capabilities();
    assert!(capabilities.supports(Feature::Chat));
    assert!(capabilities.supports(Feature::Streaming));
    assert!(!capabilities.supports(Feature::Tools));
    assert!(!capabilities.supports(Feature::Thinking));
    assert_eq!(adapter.base_url(), "https://api.together.xyz/v1");
}

#[tokio::test]
async fn chat_never_serializes_tools() {
    let transport = Arc::new(FakeTransport::responding(
        200,
        json!({"choices": [{"message": {"content": "hey"}, "finish_reason": "stop"}]}),
    ));
    let adapter = TogetherAdapter::new(SecretString::new("tg-key"), transport.clone());

    let response = adapter
        .chat(request().with_tools(vec![ToolDefinition::new("demo_tool")]))
        .await
        .expect("chat should succeed");
    assert_eq!(response.provider, ProviderId::TOGETHER);
    assert_eq!(response.text, "hey");

    let body = transport.last_body();
    assert!(body.get("tools").is_none());
    assert!(body.get("tool_choice").is_none());
    assert_eq!(
        transport.requests()[0].url,
        "https://api.together.xyz/v1/chat/completions"
    );
}

#[tokio::test]
async fn stream_ignores_event_lines_and_falls_back_to_message_content() {
    let transport = Arc::new(FakeTransport::streaming(
        200,
        &[
            "event: message\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            ": ping\n",
            "data: {\"choices\":[{\"message\":{\"content\":\" there\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}],\"usage\":{\"prompt_tokens\":2,\"completion_tokens\":2}}\n\n",
            "data: [DONE]\n\n",
        ],
    ));
    let adapter = TogetherAdapter::new(SecretString::new("tg-key"), transport.clone());

    let events = adapter
        .stream(request().enable_streaming())
        .collect::<Vec<_>>()
        .await;

    assert_eq!(
        events[..2],
        [
            StreamEvent::TextDelta("Hi".into()),
            StreamEvent::TextDelta(" there".into())
        ]
    );
    let Some(StreamEvent::Done(response)) = events.get(2) else {
        panic!("third event should be done, got {events:?}");
    };
    assert_eq!(response.text, "Hi there");
    assert_eq!(response.usage.total_tokens, 4);
    assert_eq!(events.len(), 3);
    assert!(transport.last_body().get("stream_options").is_none());
}
