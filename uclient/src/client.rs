//! The dispatcher: validation against declared capabilities, then routing to one adapter.

use std::sync::Arc;
use std::time::Instant;

use uprovider::{
    CapabilityDescriptor, ChatRequest, ChatResponse, EventStream, LlmError, ProviderAdapter,
    ProviderId, ProviderRegistry, ensure_capabilities,
};

use crate::{DispatchHooks, NoopDispatchHooks, Operation};

/// Routes normalized requests to registered provider adapters.
///
/// Validation is total before dispatch: a request that fails any check never reaches an
/// adapter, so no network call is made. Clones share the same registry and hooks.
#[derive(Clone)]
pub struct LlmClient {
    registry: Arc<ProviderRegistry>,
    hooks: Arc<dyn DispatchHooks>,
}

impl LlmClient {
    pub fn builder() -> LlmClientBuilder {
        LlmClientBuilder::new()
    }

    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            hooks: Arc::new(NoopDispatchHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Registered provider ids in sorted order.
    pub fn providers(&self) -> Vec<ProviderId> {
        self.registry.ids()
    }

    /// The capability descriptor `provider` was registered with.
    pub fn describe(&self, provider: &ProviderId) -> Result<&CapabilityDescriptor, LlmError> {
        self.registry.describe(provider)
    }

    pub fn capabilities(&self, provider: &ProviderId) -> Result<&CapabilityDescriptor, LlmError> {
        self.describe(provider)
    }

    /// Runs every pre-dispatch check without side effects.
    ///
    /// Order: provider registered, capability gate, then request shape.
    pub fn validate(&self, request: &ChatRequest) -> Result<(), LlmError> {
        self.resolve(request).map(|_| ())
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let adapter = self.admit(&request, Operation::Chat)?;
        let provider = request.provider.clone();

        self.hooks.on_dispatch_start(&provider, Operation::Chat);
        let started = Instant::now();

        match adapter.chat(request).await {
            Ok(response) => {
                self.hooks
                    .on_success(&provider, Operation::Chat, started.elapsed());
                Ok(response)
            }
            Err(error) => {
                let error = match error.provider {
                    Some(_) => error,
                    None => error.with_provider(provider.clone()),
                };
                self.hooks
                    .on_failure(&provider, Operation::Chat, &error, started.elapsed());
                Err(error.into())
            }
        }
    }

    /// Validates a streaming request and returns its lazy event stream.
    ///
    /// The request is marked as streaming before validation. The connection opens on the
    /// first poll; vendor failures arrive as a terminal `StreamEvent::Error`.
    pub fn stream(&self, mut request: ChatRequest) -> Result<EventStream<'_>, LlmError> {
        request.stream = true;
        let adapter = self.admit(&request, Operation::Stream)?;
        let provider = request.provider.clone();

        self.hooks.on_dispatch_start(&provider, Operation::Stream);
        let hooks = Arc::clone(&self.hooks);
        let started = Instant::now();

        Ok(adapter.stream(request).on_close(move |outcome| {
            hooks.on_stream_closed(&provider, &outcome, started.elapsed());
        }))
    }

    fn admit(
        &self,
        request: &ChatRequest,
        operation: Operation,
    ) -> Result<&dyn ProviderAdapter, LlmError> {
        self.resolve(request).inspect_err(|error| {
            self.hooks
                .on_validation_rejected(&request.provider, operation, error);
        })
    }

    fn resolve(&self, request: &ChatRequest) -> Result<&dyn ProviderAdapter, LlmError> {
        let adapter = self
            .registry
            .get(&request.provider)
            .ok_or_else(|| LlmError::UnsupportedProvider(request.provider.clone()))?;

        ensure_capabilities(&request.provider, adapter.capabilities(), request)?;
        request.validate()?;

        Ok(adapter)
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("providers", &self.providers())
            .finish_non_exhaustive()
    }
}

/// Collects adapters and hooks; registration errors surface from [`LlmClientBuilder::build`].
#[derive(Default)]
pub struct LlmClientBuilder {
    registry: ProviderRegistry,
    hooks: Option<Arc<dyn DispatchHooks>>,
    error: Option<LlmError>,
}

impl LlmClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adapter<A>(mut self, adapter: A) -> Self
    where
        A: ProviderAdapter + 'static,
    {
        let result = self.registry.register(adapter);
        self.record(result);
        self
    }

    /// Registers `adapter` under `id` instead of its own id.
    pub fn adapter_as(mut self, id: impl Into<ProviderId>, adapter: Arc<dyn ProviderAdapter>) -> Self {
        let result = self.registry.register_shared(id.into(), adapter);
        self.record(result);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn build(self) -> Result<LlmClient, LlmError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        Ok(LlmClient {
            registry: Arc::new(self.registry),
            hooks: self.hooks.unwrap_or_else(|| Arc::new(NoopDispatchHooks)),
        })
    }

    fn record(&mut self, result: Result<(), LlmError>) {
        if let Err(error) = result
            && self.error.is_none()
        {
            self.error = Some(error);
        }
    }
}
