#![cfg(feature = "provider-openai")]

mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures_util::{StreamExt, stream};
use serde_json::json;
use support::{FakeTransport, sse_body};
use uprovider::{
    ByteStream, ChatRequest, HttpRequest, HttpResponse, HttpStreamResponse, HttpTransport, Message,
    OpenAiAdapter, ProviderAdapter, ProviderError, ProviderErrorKind, ProviderFuture, ProviderId,
    Role, SecretString, StopReason, StreamEvent, StreamState, ToolDefinition,
};

fn adapter(transport: &Arc<FakeTransport>) -> OpenAiAdapter {
    OpenAiAdapter::new(SecretString::new("sk-live-123"), transport.clone())
}

fn request() -> ChatRequest {
    ChatRequest::new(
        ProviderId::OPENAI,
        "gpt-4o-mini",
        vec![
            Message::new(Role::System, "first"),
            Message::new(Role::User, "second"),
            Message::new(Role::Assistant, "third"),
            Message::new(Role::User, "fourth"),
        ],
    )
}

fn text_chunk(text: &str) -> serde_json::Value {
    json!({"model": "gpt-4o-mini", "choices": [{"delta": {"content": text}, "finish_reason": null}]})
}

#[tokio::test]
async fn chat_posts_bearer_request_in_message_order() {
    let transport = Arc::new(FakeTransport::responding(
        200,
        json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"content": "hello world"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 7, "completion_tokens": 3}
        }),
    ));

    let response = adapter(&transport)
        .chat(request().with_tools(vec![ToolDefinition::new("lookup")]))
        .await
        .expect("chat should succeed");

    assert_eq!(response.provider, ProviderId::OPENAI);
    assert_eq!(response.text, "hello world");
    assert_eq!(response.stop_reason, StopReason::EndTurn);
    assert_eq!(response.usage.total_tokens, 10);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "https://api.openai.com/v1/chat/completions");
    assert_eq!(requests[0].header("authorization"), Some("Bearer sk-live-123"));

    let contents = requests[0].body["messages"]
        .as_array()
        .expect("messages array")
        .iter()
        .map(|message| message["content"].as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    assert_eq!(contents, vec!["first", "second", "third", "fourth"]);
    assert_eq!(requests[0].body["tool_choice"], "auto");
    assert_eq!(requests[0].body["stream"], false);
}

#[tokio::test]
async fn chat_wraps_vendor_error_with_status() {
    let transport = Arc::new(FakeTransport::responding(
        401,
        json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}),
    ));

    let err = adapter(&transport)
        .chat(request())
        .await
        .expect_err("401 should fail");

    assert_eq!(err.kind, ProviderErrorKind::Authentication);
    assert_eq!(err.status, Some(401));
    assert_eq!(
        err.to_string(),
        "openai: Incorrect API key provided (status 401)"
    );
}

#[tokio::test]
async fn chat_transport_failure_keeps_kind_and_gains_provider() {
    let transport = Arc::new(FakeTransport::failing(ProviderError::timeout(
        "operation timed out",
    )));

    let err = adapter(&transport)
        .chat(request())
        .await
        .expect_err("timeout should fail");

    assert_eq!(err.kind, ProviderErrorKind::Timeout);
    assert_eq!(err.provider, Some(ProviderId::OPENAI));
    assert_eq!(err.status, None);
}

#[tokio::test]
async fn custom_base_url_is_used() {
    let transport = Arc::new(FakeTransport::responding(
        200,
        json!({"choices": [{"message": {"content": "ok"}}]}),
    ));

    let response = adapter(&transport)
        .with_base_url("http://localhost:8080/v1/")
        .chat(request())
        .await
        .expect("chat should succeed");

    assert_eq!(response.model, "gpt-4o-mini");
    assert_eq!(
        transport.requests()[0].url,
        "http://localhost:8080/v1/chat/completions"
    );
}

#[tokio::test]
async fn stream_is_lazy_until_polled() {
    let transport = Arc::new(FakeTransport::streaming(200, &["data: [DONE]\n"]));
    let adapter = adapter(&transport);

    let mut events = adapter.stream(request().enable_streaming());
    assert_eq!(events.state(), StreamState::Idle);
    assert_eq!(transport.call_count(), 0);

    assert!(matches!(events.next().await, Some(StreamEvent::Done(_))));
    assert_eq!(transport.call_count(), 1);
    assert_eq!(transport.last_body()["stream"], true);
}

#[tokio::test]
async fn streamed_text_deltas_concatenate_to_done_text() {
    let body = sse_body(&[
        text_chunk("Hel"),
        text_chunk("lo, "),
        json!({"choices": [{"delta": {"content": "world"}, "finish_reason": "stop"}]}),
        json!({"choices": [], "usage": {"prompt_tokens": 5, "completion_tokens": 3}}),
    ]);
    // Split mid-line so framing has to be reassembled.
    let (head, tail) = body.split_at(body.len() / 2);
    let transport = Arc::new(FakeTransport::streaming(200, &[head, tail]));

    let events = adapter(&transport)
        .stream(request().enable_streaming())
        .collect::<Vec<_>>()
        .await;

    let streamed = events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::TextDelta(text) => Some(text.as_str()),
            _ => None,
        })
        .collect::<String>();

    let terminal = events.iter().filter(|event| event.is_terminal()).count();
    assert_eq!(terminal, 1);

    let Some(StreamEvent::Done(response)) = events.last() else {
        panic!("stream should end with done, got {events:?}");
    };
    assert_eq!(streamed, "Hello, world");
    assert_eq!(response.text, streamed);
    assert_eq!(response.stop_reason, StopReason::EndTurn);
    assert_eq!(response.usage.total_tokens, 8);
}

#[tokio::test]
async fn streamed_tool_calls_are_aggregated() {
    let body = sse_body(&[
        json!({"choices": [{"delta": {"tool_calls": [
            {"index": 0, "id": "call_1", "function": {"name": "lookup", "arguments": "{\"q\":"}}
        ]}}]}),
        json!({"choices": [{"delta": {"tool_calls": [
            {"index": 0, "function": {"arguments": "\"rust\"}"}}
        ]}, "finish_reason": "tool_calls"}]}),
    ]);
    let transport = Arc::new(FakeTransport::streaming(200, &[&body]));

    let response = adapter(&transport)
        .stream(request().enable_streaming())
        .into_response()
        .await
        .expect("stream should complete");

    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].id, "call_1");
    assert_eq!(response.tool_calls[0].arguments, "{\"q\":\"rust\"}");
    assert_eq!(response.stop_reason, StopReason::ToolUse);
}

#[tokio::test]
async fn mid_stream_failure_emits_single_error_and_no_done() {
    let transport = Arc::new(FakeTransport::streaming_items(
        200,
        vec![
            Ok(format!("data: {}\n\n", text_chunk("partial")).into_bytes()),
            Err(ProviderError::transport("connection reset by peer")),
            Ok(b"data: [DONE]\n\n".to_vec()),
        ],
    ));

    let adapter = adapter(&transport);
    let mut stream = adapter.stream(request().enable_streaming());
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], StreamEvent::TextDelta("partial".into()));
    let StreamEvent::Error(error) = &events[1] else {
        panic!("second event should be an error, got {:?}", events[1]);
    };
    assert_eq!(error.kind, ProviderErrorKind::Transport);
    assert_eq!(error.provider, Some(ProviderId::OPENAI));
    assert_eq!(stream.state(), StreamState::Closed);
    assert_eq!(stream.next().await, None);
}

#[tokio::test]
async fn non_success_stream_status_is_a_terminal_error() {
    let transport = Arc::new(FakeTransport::streaming(
        429,
        &[r#"{"error":{"message":"Rate limit reached"}}"#],
    ));

    let events = adapter(&transport)
        .stream(request().enable_streaming())
        .collect::<Vec<_>>()
        .await;

    assert_eq!(events.len(), 1);
    let StreamEvent::Error(error) = &events[0] else {
        panic!("only event should be an error");
    };
    assert_eq!(error.kind, ProviderErrorKind::RateLimited);
    assert_eq!(error.status, Some(429));
    assert_eq!(error.message, "Rate limit reached");
}

#[tokio::test]
async fn stream_closed_after_finish_reason_without_done_sentinel_is_finalized() {
    let finish = json!({"choices": [{"delta": {}, "finish_reason": "stop"}]});
    let transport = Arc::new(FakeTransport::streaming(
        200,
        &[&format!(
            "data: {}\n\ndata: {}\n\ndata: {}",
            text_chunk("a"),
            text_chunk("b"),
            finish
        )],
    ));

    let events = adapter(&transport)
        .stream(request().enable_streaming())
        .collect::<Vec<_>>()
        .await;

    assert_eq!(events.len(), 3);
    let Some(StreamEvent::Done(response)) = events.last() else {
        panic!("stream should be finalized with done");
    };
    assert_eq!(response.text, "ab");
    assert_eq!(response.stop_reason, StopReason::EndTurn);
}

#[tokio::test]
async fn truncated_stream_ends_in_a_decode_error() {
    let transport = Arc::new(FakeTransport::streaming(
        200,
        &[r#"data: {"choices":[{"delta":{"content":"The answer is"}}]}"#, "\n\n"],
    ));

    let events = adapter(&transport)
        .stream(request().enable_streaming())
        .collect::<Vec<_>>()
        .await;

    assert_eq!(events.len(), 2, "got {events:?}");
    assert_eq!(events[0], StreamEvent::TextDelta("The answer is".into()));
    let StreamEvent::Error(error) = &events[1] else {
        panic!("a cut-off body must not look complete, got {:?}", events[1]);
    };
    assert_eq!(error.kind, ProviderErrorKind::Decode);
    assert_eq!(error.provider, Some(ProviderId::OPENAI));
    assert!(!events.iter().any(|event| matches!(event, StreamEvent::Done(_))));
}

/// Sets its flag when the byte stream holding it is dropped.
struct ReleaseFlag(Arc<AtomicBool>);

impl Drop for ReleaseFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Serves one text chunk, then never produces another byte.
#[derive(Default)]
struct StallingTransport {
    opened: AtomicUsize,
    released: Arc<AtomicBool>,
}

impl HttpTransport for StallingTransport {
    fn send<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
        Box::pin(async { Err(ProviderError::other("chat is not scripted")) })
    }

    fn open_stream<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> ProviderFuture<'a, Result<HttpStreamResponse, ProviderError>> {
        Box::pin(async move {
            self.opened.fetch_add(1, Ordering::SeqCst);
            let flag = ReleaseFlag(Arc::clone(&self.released));
            let first = format!("data: {}\n\n", text_chunk("partial")).into_bytes();
            let chunks = stream::iter(vec![Ok(first)])
                .chain(stream::pending())
                .map(move |item| {
                    let _held = &flag;
                    item
                });

            Ok(HttpStreamResponse {
                status: 200,
                chunks: Box::pin(chunks) as ByteStream,
            })
        })
    }
}

#[tokio::test]
async fn dropping_a_stream_mid_body_releases_the_connection() {
    let transport = Arc::new(StallingTransport::default());
    let adapter = OpenAiAdapter::new(SecretString::new("sk-live-123"), transport.clone());

    let mut stream = adapter.stream(request().enable_streaming());
    assert_eq!(
        stream.next().await,
        Some(StreamEvent::TextDelta("partial".into()))
    );
    assert!(!transport.released.load(Ordering::SeqCst));

    drop(stream);

    assert!(transport.released.load(Ordering::SeqCst));
    assert_eq!(transport.opened.load(Ordering::SeqCst), 1);
}
