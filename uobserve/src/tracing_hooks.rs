//! Structured `tracing` events for each dispatch lifecycle step.
//!
//! ```rust
//! use uclient::DispatchHooks;
//! use uobserve::TracingDispatchHooks;
//!
//! fn accepts_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! accepts_hooks(&TracingDispatchHooks);
//! ```

use std::time::Duration;

use uclient::{DispatchHooks, Operation};
use uprovider::{LlmError, ProviderError, ProviderId, StreamOutcome};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDispatchHooks;

impl DispatchHooks for TracingDispatchHooks {
    fn on_validation_rejected(&self, provider: &ProviderId, operation: Operation, error: &LlmError) {
        tracing::warn!(
            phase = "dispatch",
            event = "validation_rejected",
            provider = %provider,
            operation = operation.as_str(),
            error_kind = error.kind_label(),
            error = %error
        );
    }

    fn on_dispatch_start(&self, provider: &ProviderId, operation: Operation) {
        tracing::info!(
            phase = "dispatch",
            event = "start",
            provider = %provider,
            operation = operation.as_str()
        );
    }

    fn on_success(&self, provider: &ProviderId, operation: Operation, elapsed: Duration) {
        tracing::info!(
            phase = "dispatch",
            event = "success",
            provider = %provider,
            operation = operation.as_str(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_failure(
        &self,
        provider: &ProviderId,
        operation: Operation,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "dispatch",
            event = "failure",
            provider = %provider,
            operation = operation.as_str(),
            error_kind = ?error.kind,
            status = error.status,
            retryable = error.retryable,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }

    fn on_stream_closed(&self, provider: &ProviderId, outcome: &StreamOutcome, elapsed: Duration) {
        match outcome {
            StreamOutcome::Completed => tracing::info!(
                phase = "dispatch",
                event = "stream_closed",
                provider = %provider,
                outcome = "completed",
                elapsed_ms = elapsed.as_millis() as u64
            ),
            StreamOutcome::Failed(error) => tracing::error!(
                phase = "dispatch",
                event = "stream_closed",
                provider = %provider,
                outcome = "failed",
                error_kind = ?error.kind,
                status = error.status,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %error
            ),
            StreamOutcome::Abandoned => tracing::debug!(
                phase = "dispatch",
                event = "stream_closed",
                provider = %provider,
                outcome = "abandoned",
                elapsed_ms = elapsed.as_millis() as u64
            ),
        }
    }
}
