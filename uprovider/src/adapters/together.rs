//! Together AI adapter over its OpenAI-compatible chat-completions endpoint.
//!
//! Together declares streaming but neither tool calling nor thinking, so tools are never
//! put on the wire.

use std::sync::Arc;

use crate::{
    CapabilityDescriptor, ChatRequest, ChatResponse, EventStream, HttpTransport, ProviderAdapter,
    ProviderError, ProviderFuture, ProviderId, SecretString,
};

use super::chat_completions::{ChatCompletionsClient, Dialect};

pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";

pub struct TogetherAdapter {
    client: ChatCompletionsClient,
    capabilities: CapabilityDescriptor,
}

impl TogetherAdapter {
    pub fn new(api_key: SecretString, transport: Arc<dyn HttpTransport>) -> Self {
        let dialect = Dialect {
            provider: ProviderId::TOGETHER,
            tools: false,
            reasoning: false,
            stream_usage: false,
        };

        Self {
            client: ChatCompletionsClient::new(dialect, DEFAULT_BASE_URL, api_key, transport),
            capabilities: CapabilityDescriptor::new().with_streaming(true),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.set_base_url(base_url);
        self
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

impl std::fmt::Debug for TogetherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TogetherAdapter")
            .field("base_url", &self.base_url())
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl ProviderAdapter for TogetherAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::TOGETHER
    }

    fn capabilities(&self) -> &CapabilityDescriptor {
        &self.capabilities
    }

    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
        Box::pin(async move { self.client.chat(request).await })
    }

    fn stream<'a>(&'a self, request: ChatRequest) -> EventStream<'a> {
        self.client.stream(request)
    }
}
