use std::time::Duration;

use uprovider::{LlmError, ProviderError, ProviderId, StreamOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Chat,
    Stream,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Stream => "stream",
        }
    }
}

/// Lifecycle callbacks around each dispatched call.
///
/// Hooks observe; they cannot alter the request or the outcome.
pub trait DispatchHooks: Send + Sync {
    /// A request failed validation; no adapter was invoked.
    fn on_validation_rejected(
        &self,
        _provider: &ProviderId,
        _operation: Operation,
        _error: &LlmError,
    ) {
    }

    fn on_dispatch_start(&self, _provider: &ProviderId, _operation: Operation) {}

    fn on_success(&self, _provider: &ProviderId, _operation: Operation, _elapsed: Duration) {}

    fn on_failure(
        &self,
        _provider: &ProviderId,
        _operation: Operation,
        _error: &ProviderError,
        _elapsed: Duration,
    ) {
    }

    /// A dispatched stream reached its terminal event or was dropped.
    fn on_stream_closed(
        &self,
        _provider: &ProviderId,
        _outcome: &StreamOutcome,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatchHooks;

impl DispatchHooks for NoopDispatchHooks {}
