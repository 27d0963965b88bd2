use std::sync::{Arc, Mutex};

use futures_util::{StreamExt, stream};
use serde_json::{Value, json};
use uclient::LlmClient;
use uprovider::{
    AllowedTools, AnthropicAdapter, ByteStream, ChatRequest, Feature, HttpRequest, HttpResponse,
    HttpStreamResponse, HttpTransport, LlmError, Message, OpenAiAdapter, ProviderError,
    ProviderFuture, ProviderId, Role, SecretString, StreamEvent, TogetherAdapter, ToolDefinition,
    ToolMode,
};

/// Counts calls and answers with one canned JSON body or SSE body.
#[derive(Default)]
struct ScriptedTransport {
    requests: Mutex<Vec<HttpRequest>>,
    body: Mutex<Option<Value>>,
    sse: Mutex<Option<String>>,
}

impl ScriptedTransport {
    fn json(body: Value) -> Arc<Self> {
        let transport = Self::default();
        *transport.body.lock().expect("body lock") = Some(body);
        Arc::new(transport)
    }

    fn sse(body: &str) -> Arc<Self> {
        let transport = Self::default();
        *transport.sse.lock().expect("sse lock") = Some(body.to_string());
        Arc::new(transport)
    }

    fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
    ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            let body = self
                .body
                .lock()
                .expect("body lock")
                .take()
                .ok_or_else(|| ProviderError::other("no canned response"))?;
            Ok(HttpResponse {
                status: 200,
                body: body.to_string(),
            })
        })
    }

    fn open_stream<'a>(
        &'a self,
        request: HttpRequest,
    ) -> ProviderFuture<'a, Result<HttpStreamResponse, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            let body = self
                .sse
                .lock()
                .expect("sse lock")
                .take()
                .ok_or_else(|| ProviderError::other("no canned stream"))?;
            Ok(HttpStreamResponse {
                status: 200,
                chunks: Box::pin(stream::iter(vec![Ok(body.into_bytes())])) as ByteStream,
            })
        })
    }
}

struct Fixture {
    client: LlmClient,
    openai: Arc<ScriptedTransport>,
    anthropic: Arc<ScriptedTransport>,
    together: Arc<ScriptedTransport>,
}

impl Fixture {
    fn new(openai_tools: AllowedTools) -> Self {
        Self::with_transports(
            openai_tools,
            Arc::new(ScriptedTransport::default()),
            Arc::new(ScriptedTransport::default()),
            Arc::new(ScriptedTransport::default()),
        )
    }

    fn with_transports(
        openai_tools: AllowedTools,
        openai: Arc<ScriptedTransport>,
        anthropic: Arc<ScriptedTransport>,
        together: Arc<ScriptedTransport>,
    ) -> Self {
        let client = LlmClient::builder()
            .adapter(
                OpenAiAdapter::new(SecretString::new("sk-openai"), openai.clone())
                    .with_allowed_tools(openai_tools),
            )
            .adapter(AnthropicAdapter::new(
                SecretString::new("sk-anthropic"),
                anthropic.clone(),
            ))
            .adapter(TogetherAdapter::new(
                SecretString::new("sk-together"),
                together.clone(),
            ))
            .build()
            .expect("fixture client should build");

        Self {
            client,
            openai,
            anthropic,
            together,
        }
    }

    fn total_calls(&self) -> usize {
        self.openai.calls() + self.anthropic.calls() + self.together.calls()
    }
}

fn request(provider: ProviderId) -> ChatRequest {
    ChatRequest::new(provider, "model-x", vec![Message::new(Role::User, "hello")])
}

#[tokio::test]
async fn unconfigured_provider_is_rejected_without_network_calls() {
    let fixture = Fixture::new(AllowedTools::Any);
    let dummy = ProviderId::from("dummy");

    let chat = fixture
        .client
        .chat(request(dummy.clone()))
        .await
        .expect_err("dummy is not registered");
    let stream = fixture
        .client
        .stream(request(dummy.clone()))
        .expect_err("dummy is not registered");

    assert_eq!(chat, LlmError::UnsupportedProvider(dummy.clone()));
    assert_eq!(stream, LlmError::UnsupportedProvider(dummy));
    assert_eq!(fixture.total_calls(), 0);
}

#[tokio::test]
async fn anthropic_streaming_is_rejected_before_dispatch() {
    let fixture = Fixture::new(AllowedTools::Any);

    let err = fixture
        .client
        .stream(request(ProviderId::ANTHROPIC))
        .expect_err("anthropic does not declare streaming");
    assert_eq!(
        err,
        LlmError::unsupported_feature(ProviderId::ANTHROPIC, Feature::Streaming)
    );

    let err = fixture
        .client
        .chat(request(ProviderId::ANTHROPIC).enable_streaming())
        .await
        .expect_err("stream flag on chat is validated as given");
    assert_eq!(
        err,
        LlmError::unsupported_feature(ProviderId::ANTHROPIC, Feature::Streaming)
    );
    assert_eq!(fixture.total_calls(), 0);
}

#[tokio::test]
async fn together_rejects_tools_before_dispatch() {
    let fixture = Fixture::new(AllowedTools::Any);

    let err = fixture
        .client
        .chat(request(ProviderId::TOGETHER).with_tools(vec![ToolDefinition::new("demo_tool")]))
        .await
        .expect_err("together does not declare tools");

    assert_eq!(
        err,
        LlmError::unsupported_feature(ProviderId::TOGETHER, Feature::Tools)
    );
    assert_eq!(fixture.together.calls(), 0);
}

#[tokio::test]
async fn allow_list_rejection_names_the_offending_tool() {
    let fixture = Fixture::new(AllowedTools::only(["y"]));

    let err = fixture
        .client
        .chat(request(ProviderId::OPENAI).with_tools(vec![ToolDefinition::new("x")]))
        .await
        .expect_err("x is outside the allow-list");

    assert_eq!(
        err,
        LlmError::ToolNotAvailable {
            provider: ProviderId::OPENAI,
            tools: vec!["x".to_string()],
        }
    );
    assert_eq!(fixture.openai.calls(), 0);
}

#[tokio::test]
async fn capability_errors_take_precedence_over_shape_errors() {
    let fixture = Fixture::new(AllowedTools::Any);

    let mut malformed = ChatRequest::new(ProviderId::TOGETHER, "", Vec::new())
        .with_tools(vec![ToolDefinition::new("demo_tool")]);
    malformed.tool_mode = None;

    assert_eq!(
        fixture.client.validate(&malformed),
        Err(LlmError::unsupported_feature(
            ProviderId::TOGETHER,
            Feature::Tools
        ))
    );

    let shape_only = request(ProviderId::OPENAI).with_temperature(3.5);
    assert!(matches!(
        fixture.client.validate(&shape_only),
        Err(LlmError::InvalidRequest(_))
    ));
    assert_eq!(fixture.total_calls(), 0);
}

#[test]
fn registering_the_same_provider_twice_fails_at_build() {
    let transport: Arc<ScriptedTransport> = Arc::new(ScriptedTransport::default());
    let err = LlmClient::builder()
        .adapter(OpenAiAdapter::new(SecretString::new("a"), transport.clone()))
        .adapter(OpenAiAdapter::new(SecretString::new("b"), transport))
        .build()
        .expect_err("openai registered twice");

    assert_eq!(
        err,
        LlmError::configuration("provider 'openai' is already registered")
    );
}

#[tokio::test]
async fn openai_chat_round_trips_through_the_dispatcher() {
    let openai = ScriptedTransport::json(json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": { "name": "lookup", "arguments": "{\"q\":\"rust\"}" }
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": { "prompt_tokens": 9, "completion_tokens": 4, "total_tokens": 13 }
    }));
    let fixture = Fixture::with_transports(
        AllowedTools::only(["lookup"]),
        openai.clone(),
        Arc::new(ScriptedTransport::default()),
        Arc::new(ScriptedTransport::default()),
    );

    let response = fixture
        .client
        .chat(
            request(ProviderId::OPENAI)
                .with_tools(vec![ToolDefinition::new("lookup")])
                .with_tool_mode(ToolMode::Required),
        )
        .await
        .expect("chat should succeed");

    assert_eq!(response.provider, ProviderId::OPENAI);
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].name, "lookup");
    assert_eq!(response.usage.total_tokens, 13);
    assert_eq!(openai.calls(), 1);
}

#[tokio::test]
async fn together_stream_is_normalized_and_terminated_once() {
    let together = ScriptedTransport::sse(concat!(
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hel\"}}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    ));
    let fixture = Fixture::with_transports(
        AllowedTools::Any,
        Arc::new(ScriptedTransport::default()),
        Arc::new(ScriptedTransport::default()),
        together.clone(),
    );

    let stream = fixture
        .client
        .stream(request(ProviderId::TOGETHER))
        .expect("together declares streaming");
    assert_eq!(together.calls(), 0, "streams open lazily");

    let events = stream.collect::<Vec<_>>().await;
    let text = events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::TextDelta(delta) => Some(delta.as_str()),
            _ => None,
        })
        .collect::<String>();
    let terminals = events.iter().filter(|event| event.is_terminal()).count();

    assert_eq!(text, "Hello");
    assert_eq!(terminals, 1);
    match events.last() {
        Some(StreamEvent::Done(response)) => assert_eq!(response.text, "Hello"),
        other => panic!("expected Done, got {other:?}"),
    }
    assert_eq!(together.calls(), 1);
}
