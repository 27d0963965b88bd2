use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use uclient::{DispatchHooks, Operation};
use uprovider::{LlmError, ProviderError, ProviderId, StreamOutcome};

/// Swallows panics raised by the wrapped hooks so they never unwind into a dispatch.
pub struct SafeDispatchHooks<H> {
    inner: H,
}

impl<H> SafeDispatchHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H> DispatchHooks for SafeDispatchHooks<H>
where
    H: DispatchHooks,
{
    fn on_validation_rejected(&self, provider: &ProviderId, operation: Operation, error: &LlmError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_validation_rejected(provider, operation, error)
        }));
    }

    fn on_dispatch_start(&self, provider: &ProviderId, operation: Operation) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_dispatch_start(provider, operation)
        }));
    }

    fn on_success(&self, provider: &ProviderId, operation: Operation, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(provider, operation, elapsed)
        }));
    }

    fn on_failure(
        &self,
        provider: &ProviderId,
        operation: Operation,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(provider, operation, error, elapsed)
        }));
    }

    fn on_stream_closed(&self, provider: &ProviderId, outcome: &StreamOutcome, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_stream_closed(provider, outcome, elapsed)
        }));
    }
}
