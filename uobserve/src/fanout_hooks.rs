use std::time::Duration;

use uclient::{DispatchHooks, Operation};
use uprovider::{LlmError, ProviderError, ProviderId, StreamOutcome};

/// Forwards every callback to each registered hook, in registration order.
#[derive(Default)]
pub struct FanoutDispatchHooks {
    hooks: Vec<Box<dyn DispatchHooks>>,
}

impl FanoutDispatchHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<H>(mut self, hooks: H) -> Self
    where
        H: DispatchHooks + 'static,
    {
        self.hooks.push(Box::new(hooks));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl DispatchHooks for FanoutDispatchHooks {
    fn on_validation_rejected(&self, provider: &ProviderId, operation: Operation, error: &LlmError) {
        for hooks in &self.hooks {
            hooks.on_validation_rejected(provider, operation, error);
        }
    }

    fn on_dispatch_start(&self, provider: &ProviderId, operation: Operation) {
        for hooks in &self.hooks {
            hooks.on_dispatch_start(provider, operation);
        }
    }

    fn on_success(&self, provider: &ProviderId, operation: Operation, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_success(provider, operation, elapsed);
        }
    }

    fn on_failure(
        &self,
        provider: &ProviderId,
        operation: Operation,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        for hooks in &self.hooks {
            hooks.on_failure(provider, operation, error, elapsed);
        }
    }

    fn on_stream_closed(&self, provider: &ProviderId, outcome: &StreamOutcome, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_stream_closed(provider, outcome, elapsed);
        }
    }
}

impl std::fmt::Debug for FanoutDispatchHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutDispatchHooks")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
