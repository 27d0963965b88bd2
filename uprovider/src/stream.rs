//! Streaming event contracts, the terminal-state stream wrapper, and in-memory utilities.
//!
//! ```rust
//! use uprovider::{EventStream, StreamEvent, StreamState, VecEventStream};
//!
//! let stream = EventStream::new(VecEventStream::new(vec![Ok(StreamEvent::TextDelta("hello".into()))]));
//! assert_eq!(stream.state(), StreamState::Idle);
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_util::StreamExt;
use serde_json::Value;

use crate::{ChatResponse, ProviderError, ProviderId, StopReason, TokenUsage, ToolCall};

/// A fragment of one tool call. `index` groups fragments of the same call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallDelta {
    pub index: u32,
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TextDelta(String),
    ToolCallDelta(ToolCallDelta),
    ThinkingDelta(String),
    Done(ChatResponse),
    Error(ProviderError),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Error(_))
    }
}

/// Adapter-side stream before terminal guarantees are applied.
pub type RawEventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<StreamEvent, ProviderError>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Created, not yet polled; no connection has been opened.
    Idle,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    Completed,
    Failed(ProviderError),
    /// Dropped by the consumer before a terminal event.
    Abandoned,
}

type CloseCallback<'a> = Box<dyn FnOnce(StreamOutcome) + Send + 'a>;

/// Normalized event sequence handed to callers.
///
/// Invariants for consumers:
/// - Events are emitted in source order.
/// - `TextDelta`, `ThinkingDelta` and `ToolCallDelta` may appear zero or more times.
/// - Exactly one `Done` or one `Error` ends the sequence; polling afterwards yields `None`.
/// - Reaching the terminal event, or dropping the stream, releases the underlying connection.
pub struct EventStream<'a> {
    inner: Option<RawEventStream<'a>>,
    state: StreamState,
    on_close: Option<CloseCallback<'a>>,
}

impl<'a> EventStream<'a> {
    pub fn new<S>(inner: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent, ProviderError>> + Send + 'a,
    {
        Self {
            inner: Some(Box::pin(inner)),
            state: StreamState::Idle,
            on_close: None,
        }
    }

    /// A stream whose only event is `Error(error)`.
    pub fn from_error(error: ProviderError) -> Self {
        Self::new(VecEventStream::new(vec![Err(error)]))
    }

    /// Registers a callback run once when the stream closes or is dropped early.
    ///
    /// Callbacks registered earlier run first.
    pub fn on_close(mut self, callback: impl FnOnce(StreamOutcome) + Send + 'a) -> Self {
        self.on_close = Some(match self.on_close.take() {
            Some(previous) => Box::new(move |outcome: StreamOutcome| {
                previous(outcome.clone());
                callback(outcome);
            }),
            None => Box::new(callback),
        });
        self
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Drains the stream and returns the `Done` aggregate, or the terminal error.
    pub async fn into_response(mut self) -> Result<ChatResponse, ProviderError> {
        while let Some(event) = self.next().await {
            match event {
                StreamEvent::Done(response) => return Ok(response),
                StreamEvent::Error(error) => return Err(error),
                _ => {}
            }
        }

        Err(ProviderError::other("stream already closed"))
    }

    fn close(&mut self, outcome: StreamOutcome) {
        self.state = StreamState::Closed;
        self.inner = None;
        if let Some(callback) = self.on_close.take() {
            callback(outcome);
        }
    }
}

impl Stream for EventStream<'_> {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<StreamEvent>> {
        let this = self.as_mut().get_mut();
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };
        this.state = StreamState::Open;

        let event = match inner.as_mut().poll_next(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Some(Ok(event))) => event,
            Poll::Ready(Some(Err(error))) => StreamEvent::Error(error),
            Poll::Ready(None) => StreamEvent::Error(ProviderError::decode(
                "stream ended before a terminal event",
            )),
        };

        match &event {
            StreamEvent::Done(_) => this.close(StreamOutcome::Completed),
            StreamEvent::Error(error) => this.close(StreamOutcome::Failed(error.clone())),
            _ => {}
        }

        Poll::Ready(Some(event))
    }
}

impl Drop for EventStream<'_> {
    fn drop(&mut self) {
        if self.state != StreamState::Closed
            && let Some(callback) = self.on_close.take()
        {
            callback(StreamOutcome::Abandoned);
        }
    }
}

impl std::fmt::Debug for EventStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct VecEventStream {
    events: VecDeque<Result<StreamEvent, ProviderError>>,
}

impl VecEventStream {
    pub fn new(events: Vec<Result<StreamEvent, ProviderError>>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl Stream for VecEventStream {
    type Item = Result<StreamEvent, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<StreamEvent, ProviderError>>> {
        Poll::Ready(self.events.pop_front())
    }
}

/// Folds deltas into the aggregate carried by the `Done` event.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    thinking: String,
    tool_calls: BTreeMap<u32, ToolCall>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, delta: &str) {
        self.text.push_str(delta);
    }

    pub fn push_thinking(&mut self, delta: &str) {
        self.thinking.push_str(delta);
    }

    pub fn push_tool_call(&mut self, delta: &ToolCallDelta) {
        let entry = self
            .tool_calls
            .entry(delta.index)
            .or_insert_with(|| ToolCall {
                id: format!("tool_call_{}", delta.index),
                name: String::new(),
                arguments: String::new(),
            });

        if let Some(id) = &delta.id {
            entry.id = id.clone();
        }

        if let Some(name) = &delta.name {
            entry.name = name.clone();
        }

        entry.arguments.push_str(&delta.arguments);
    }

    /// Records any delta event; terminal events are ignored.
    pub fn push(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::TextDelta(delta) => self.push_text(delta),
            StreamEvent::ThinkingDelta(delta) => self.push_thinking(delta),
            StreamEvent::ToolCallDelta(delta) => self.push_tool_call(delta),
            StreamEvent::Done(_) | StreamEvent::Error(_) => {}
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn finish(
        self,
        provider: ProviderId,
        model: String,
        stop_reason: StopReason,
        usage: TokenUsage,
    ) -> ChatResponse {
        ChatResponse {
            provider,
            model,
            text: self.text,
            tool_calls: self.tool_calls.into_values().collect(),
            thinking: (!self.thinking.is_empty()).then_some(self.thinking),
            stop_reason,
            usage,
            raw: Value::Null,
        }
    }
}
