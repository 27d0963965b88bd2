//! Request building, response parsing and stream normalization shared by the
//! OpenAI-compatible chat-completions adapters.

mod serde_api;

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use serde_json::Value;

use crate::{
    ChatRequest, ChatResponse, EventStream, HttpRequest, HttpTransport, ProviderError, ProviderId,
    SecretString, SseDecoder, SsePayload, StopReason, StreamAccumulator, StreamEvent, TokenUsage,
    ToolCall, ToolCallDelta,
};

use super::{endpoint, open_checked, send_checked};
use serde_api::{ApiResponse, ApiStreamChunk, build_api_request, parse_finish_reason};

/// Per-vendor switches over the common wire format.
#[derive(Debug, Clone)]
pub(crate) struct Dialect {
    pub provider: ProviderId,
    /// Serialize `tools` and `tool_choice`.
    pub tools: bool,
    /// Surface `reasoning_content` / `reasoning` as thinking.
    pub reasoning: bool,
    /// Ask for a trailing usage chunk on streams.
    pub stream_usage: bool,
}

pub(crate) struct ChatCompletionsClient {
    dialect: Dialect,
    base_url: String,
    api_key: SecretString,
    transport: Arc<dyn HttpTransport>,
}

impl ChatCompletionsClient {
    pub(crate) fn new(
        dialect: Dialect,
        base_url: impl Into<String>,
        api_key: SecretString,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            dialect,
            base_url: base_url.into(),
            api_key,
            transport,
        }
    }

    pub(crate) fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn build_http_request(
        &self,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<HttpRequest, ProviderError> {
        let body = serde_json::to_value(build_api_request(request, &self.dialect, stream))
            .map_err(|err| {
                ProviderError::invalid_request(err.to_string())
                    .with_provider(self.dialect.provider.clone())
            })?;

        Ok(
            HttpRequest::post(endpoint(&self.base_url, "chat/completions"), body).with_header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose()),
            ),
        )
    }

    pub(crate) async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let http_request = self.build_http_request(&request, false)?;
        let body = send_checked(
            self.transport.as_ref(),
            http_request,
            &self.dialect.provider,
        )
        .await?;

        parse_response(&self.dialect, &request.model, &body)
    }

    pub(crate) fn stream(&self, request: ChatRequest) -> EventStream<'static> {
        let http_request = match self.build_http_request(&request, true) {
            Ok(http_request) => http_request,
            Err(err) => return EventStream::from_error(err),
        };

        let provider = self.dialect.provider.clone();
        let transport = Arc::clone(&self.transport);
        let mut normalizer = ChunkNormalizer::new(&self.dialect, request.model);

        let events = try_stream! {
            let mut chunks = open_checked(transport.as_ref(), http_request, &provider).await?;
            let mut decoder = SseDecoder::new();
            let mut finished = false;

            while let Some(chunk) = chunks.next().await {
                let chunk = chunk.map_err(|err| err.with_provider(provider.clone()))?;
                for payload in decoder.push(&chunk) {
                    match payload {
                        SsePayload::Done => {
                            finished = true;
                            break;
                        }
                        SsePayload::Data(data) => {
                            for event in normalizer.push(&data)? {
                                yield event;
                            }
                        }
                    }
                }

                if finished {
                    break;
                }
            }

            if !finished {
                match decoder.finish() {
                    Some(SsePayload::Done) => finished = true,
                    Some(SsePayload::Data(data)) => {
                        for event in normalizer.push(&data)? {
                            yield event;
                        }
                    }
                    None => {}
                }
            }
            drop(chunks);

            // A body that closes without `[DONE]` or a finish_reason was cut off.
            if !finished && !normalizer.is_complete() {
                Err::<(), _>(
                    ProviderError::decode("stream ended before completion")
                        .with_provider(provider.clone()),
                )?;
            }
            yield StreamEvent::Done(normalizer.finish());
        };

        EventStream::new(events)
    }
}

pub(crate) fn parse_response(
    dialect: &Dialect,
    requested_model: &str,
    body: &str,
) -> Result<ChatResponse, ProviderError> {
    let decode =
        |message: String| ProviderError::decode(message).with_provider(dialect.provider.clone());

    let raw = serde_json::from_str::<Value>(body).map_err(|err| decode(err.to_string()))?;
    let parsed = serde_json::from_value::<ApiResponse>(raw.clone())
        .map_err(|err| decode(err.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| decode("response did not include choices".to_string()))?;

    let thinking = dialect
        .reasoning
        .then(|| choice.message.reasoning().map(str::to_string))
        .flatten();

    Ok(ChatResponse {
        provider: dialect.provider.clone(),
        model: parsed
            .model
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| requested_model.to_string()),
        text: choice.message.content.unwrap_or_default(),
        tool_calls: choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(ToolCall::from)
            .collect(),
        thinking,
        stop_reason: parse_finish_reason(choice.finish_reason.as_deref()),
        usage: parsed.usage.map(TokenUsage::from).unwrap_or_default(),
        raw,
    })
}

/// Turns chat-completions chunk payloads into normalized events and the final aggregate.
pub(crate) struct ChunkNormalizer {
    provider: ProviderId,
    reasoning: bool,
    model: String,
    accumulator: StreamAccumulator,
    stop_reason: StopReason,
    saw_finish_reason: bool,
    usage: TokenUsage,
}

impl ChunkNormalizer {
    pub(crate) fn new(dialect: &Dialect, model: String) -> Self {
        Self {
            provider: dialect.provider.clone(),
            reasoning: dialect.reasoning,
            model,
            accumulator: StreamAccumulator::new(),
            stop_reason: StopReason::Other,
            saw_finish_reason: false,
            usage: TokenUsage::default(),
        }
    }

    /// Decodes one `data:` payload. Payloads that are not JSON are skipped.
    pub(crate) fn push(&mut self, payload: &str) -> Result<Vec<StreamEvent>, ProviderError> {
        let chunk = match serde_json::from_str::<ApiStreamChunk>(payload) {
            Ok(chunk) => chunk,
            Err(err) => {
                tracing::debug!(
                    provider = %self.provider,
                    error = %err,
                    "skipping unparseable stream payload"
                );
                return Ok(Vec::new());
            }
        };

        if let Some(error) = chunk.error {
            let message = error
                .message
                .unwrap_or_else(|| "stream reported an error".to_string());
            return Err(ProviderError::other(message).with_provider(self.provider.clone()));
        }

        if let Some(model) = chunk.model.filter(|model| !model.is_empty()) {
            self.model = model;
        }

        if let Some(usage) = chunk.usage {
            self.usage = usage.into();
        }

        let mut events = Vec::new();
        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(events);
        };
        let delta = choice.delta.unwrap_or_default();

        if self.reasoning
            && let Some(thinking) = delta.reasoning()
        {
            self.accumulator.push_thinking(thinking);
            events.push(StreamEvent::ThinkingDelta(thinking.to_string()));
        }

        let text = delta
            .content
            .filter(|text| !text.is_empty())
            .or_else(|| choice.message.and_then(|message| message.content))
            .filter(|text| !text.is_empty());
        if let Some(text) = text {
            self.accumulator.push_text(&text);
            events.push(StreamEvent::TextDelta(text));
        }

        for call in delta.tool_calls.unwrap_or_default() {
            let (name, arguments) = match call.function {
                Some(function) => (function.name, function.arguments.unwrap_or_default()),
                None => (None, String::new()),
            };
            let tool_delta = ToolCallDelta {
                index: call.index.unwrap_or(0),
                id: call.id,
                name,
                arguments,
            };
            self.accumulator.push_tool_call(&tool_delta);
            events.push(StreamEvent::ToolCallDelta(tool_delta));
        }

        if choice.finish_reason.is_some() {
            self.stop_reason = parse_finish_reason(choice.finish_reason.as_deref());
            self.saw_finish_reason = true;
        }

        Ok(events)
    }

    /// True once a chunk has carried a `finish_reason`.
    pub(crate) fn is_complete(&self) -> bool {
        self.saw_finish_reason
    }

    pub(crate) fn finish(self) -> ChatResponse {
        self.accumulator
            .finish(self.provider, self.model, self.stop_reason, self.usage)
    }
}
