//! `metrics` counters and histograms for dispatched calls.
//!
//! Emitted series:
//! - `unillm_dispatch_rejected_total{provider, operation, error_kind}`
//! - `unillm_dispatch_start_total{provider, operation}`
//! - `unillm_dispatch_success_total{provider, operation}`
//! - `unillm_dispatch_failure_total{provider, operation, error_kind}`
//! - `unillm_dispatch_stream_closed_total{provider, outcome}`
//! - `unillm_dispatch_duration_seconds{provider, operation, status}`

use std::time::Duration;

use uclient::{DispatchHooks, Operation};
use uprovider::{LlmError, ProviderError, ProviderId, StreamOutcome};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsDispatchHooks;

impl DispatchHooks for MetricsDispatchHooks {
    fn on_validation_rejected(&self, provider: &ProviderId, operation: Operation, error: &LlmError) {
        metrics::counter!(
            "unillm_dispatch_rejected_total",
            "provider" => provider.to_string(),
            "operation" => operation.as_str(),
            "error_kind" => error.kind_label()
        )
        .increment(1);
    }

    fn on_dispatch_start(&self, provider: &ProviderId, operation: Operation) {
        metrics::counter!(
            "unillm_dispatch_start_total",
            "provider" => provider.to_string(),
            "operation" => operation.as_str()
        )
        .increment(1);
    }

    fn on_success(&self, provider: &ProviderId, operation: Operation, elapsed: Duration) {
        metrics::counter!(
            "unillm_dispatch_success_total",
            "provider" => provider.to_string(),
            "operation" => operation.as_str()
        )
        .increment(1);
        record_duration(provider, operation, "success", elapsed);
    }

    fn on_failure(
        &self,
        provider: &ProviderId,
        operation: Operation,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "unillm_dispatch_failure_total",
            "provider" => provider.to_string(),
            "operation" => operation.as_str(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        record_duration(provider, operation, "failure", elapsed);
    }

    fn on_stream_closed(&self, provider: &ProviderId, outcome: &StreamOutcome, elapsed: Duration) {
        let outcome = match outcome {
            StreamOutcome::Completed => "completed",
            StreamOutcome::Failed(_) => "failed",
            StreamOutcome::Abandoned => "abandoned",
        };

        metrics::counter!(
            "unillm_dispatch_stream_closed_total",
            "provider" => provider.to_string(),
            "outcome" => outcome
        )
        .increment(1);
        record_duration(provider, Operation::Stream, outcome, elapsed);
    }
}

fn record_duration(provider: &ProviderId, operation: Operation, status: &'static str, elapsed: Duration) {
    metrics::histogram!(
        "unillm_dispatch_duration_seconds",
        "provider" => provider.to_string(),
        "operation" => operation.as_str(),
        "status" => status
    )
    .record(elapsed.as_secs_f64());
}
