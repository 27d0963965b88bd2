//! OpenAI chat-completions adapter.
//!
//! ```rust
//! # #[cfg(feature = "http-transport")]
//! # fn main() {
//! use std::sync::Arc;
//!
//! use uprovider::adapters::openai::OpenAiAdapter;
//! use uprovider::{AllowedTools, ProviderAdapter, ReqwestTransport, SecretString};
//!
//! let adapter = OpenAiAdapter::new(SecretString::new("sk-test"), Arc::new(ReqwestTransport::default()))
//!     .with_allowed_tools(AllowedTools::only(["search"]));
//!
//! assert!(adapter.capabilities().supports_streaming);
//! assert!(!adapter.capabilities().allowed_tools.permits("shell"));
//! # }
//! # #[cfg(not(feature = "http-transport"))]
//! # fn main() {}
//! ```

use std::sync::Arc;

use crate::{
    AllowedTools, CapabilityDescriptor, ChatRequest, ChatResponse, EventStream, HttpTransport,
    ProviderAdapter, ProviderError, ProviderFuture, ProviderId, SecretString,
};

use super::chat_completions::{ChatCompletionsClient, Dialect};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiAdapter {
    client: ChatCompletionsClient,
    capabilities: CapabilityDescriptor,
}

impl OpenAiAdapter {
    pub fn new(api_key: SecretString, transport: Arc<dyn HttpTransport>) -> Self {
        let dialect = Dialect {
            provider: ProviderId::OPENAI,
            tools: true,
            reasoning: true,
            stream_usage: true,
        };

        Self {
            client: ChatCompletionsClient::new(dialect, DEFAULT_BASE_URL, api_key, transport),
            capabilities: CapabilityDescriptor::new()
                .with_streaming(true)
                .with_tools(AllowedTools::Any)
                .with_thinking(true),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.set_base_url(base_url);
        self
    }

    pub fn with_allowed_tools(mut self, allowed_tools: AllowedTools) -> Self {
        self.capabilities = self.capabilities.with_tools(allowed_tools);
        self
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

impl std::fmt::Debug for OpenAiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAdapter")
            .field("base_url", &self.base_url())
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl ProviderAdapter for OpenAiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OPENAI
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
