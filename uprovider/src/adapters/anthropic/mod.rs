//! Anthropic messages adapter.
//!
//! Streaming is not declared for this provider, so the dispatcher rejects streaming requests
//! before they reach the adapter. Thinking maps to the extended-thinking request block.
//!
//! ```rust
//! # #[cfg(feature = "http-transport")]
//! # fn main() {
//! use std::sync::Arc;
//!
//! use uprovider::adapters::anthropic::AnthropicAdapter;
//! use uprovider::{Feature, ProviderAdapter, ReqwestTransport, SecretString};
//!
//! let adapter = AnthropicAdapter::new(
//!     SecretString::new("sk-ant-test"),
//!     Arc::new(ReqwestTransport::default()),
//! )
//! .with_thinking_budget(2048);
//!
//! assert!(!adapter.capabilities().supports(Feature::Streaming));
//! assert!(adapter.capabilities().supports(Feature::Thinking));
//! # }
//! # #[cfg(not(feature = "http-transport"))]
//! # fn main() {}
//! ```

mod serde_api;

use std::sync::Arc;

use serde_json::Value;

use crate::{
    AllowedTools, CapabilityDescriptor, ChatRequest, ChatResponse, HttpRequest, HttpTransport,
    ProviderAdapter, ProviderError, ProviderFuture, ProviderId, SecretString, ToolCall,
};

use super::{endpoint, send_checked};
use serde_api::{
    ApiResponse, ApiResponseBlock, TranslationDefaults, build_api_request, parse_stop_reason,
};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_THINKING_BUDGET: u32 = 1024;

pub struct AnthropicAdapter {
    api_key: SecretString,
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    defaults: TranslationDefaults,
    capabilities: CapabilityDescriptor,
}

impl AnthropicAdapter {
    pub fn new(api_key: SecretString, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_key,
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            defaults: TranslationDefaults {
                max_tokens: DEFAULT_MAX_TOKENS,
                thinking_budget: DEFAULT_THINKING_BUDGET,
            },
            capabilities: CapabilityDescriptor::new()
                .with_tools(AllowedTools::Any)
                .with_thinking(true),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_allowed_tools(mut self, allowed_tools: AllowedTools) -> Self {
        self.capabilities = self.capabilities.with_tools(allowed_tools);
        self
    }

    /// `max_tokens` sent when the request does not set one.
    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.defaults.max_tokens = max_tokens;
        self
    }

    pub fn with_thinking_budget(mut self, budget_tokens: u32) -> Self {
        self.defaults.thinking_budget = budget_tokens;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn build_http_request(
        &self,
        request: &ChatRequest,
    ) -> Result<HttpRequest, ProviderError> {
        let with_provider = |err: ProviderError| err.with_provider(ProviderId::ANTHROPIC);
        let api_request = build_api_request(request, self.defaults).map_err(with_provider)?;
        let body = serde_json::to_value(api_request)
            .map_err(|err| with_provider(ProviderError::invalid_request(err.to_string())))?;

        Ok(HttpRequest::post(endpoint(&self.base_url, "messages"), body)
            .with_header("x-api-key", self.api_key.expose())
            .with_header("anthropic-version", API_VERSION))
    }
}

impl std::fmt::Debug for AnthropicAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicAdapter")
            .field("base_url", &self.base_url)
            .field("defaults", &self.defaults)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl ProviderAdapter for AnthropicAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::ANTHROPIC
    }

    fn capabilities(&self) -> &CapabilityDescriptor {
        &self.capabilities
    }

    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
        Box::pin(async move {
            let http_request = self.build_http_request(&request)?;
            let body =
                send_checked(self.transport.as_ref(), http_request, &ProviderId::ANTHROPIC).await?;

            parse_response(&request.model, &body)
        })
    }
}

pub(crate) fn parse_response(
    requested_model: &str,
    body: &str,
) -> Result<ChatResponse, ProviderError> {
    let decode =
        |message: String| ProviderError::decode(message).with_provider(ProviderId::ANTHROPIC);

    let raw = serde_json::from_str::<Value>(body).map_err(|err| decode(err.to_string()))?;
    let parsed = serde_json::from_value::<ApiResponse>(raw.clone())
        .map_err(|err| decode(err.to_string()))?;

    let mut text = String::new();
    let mut thinking = Vec::new();
    let mut tool_calls = Vec::new();
    for block in parsed.content {
        match block {
            ApiResponseBlock::Text { text: part } => text.push_str(&part),
            ApiResponseBlock::Thinking { thinking: part } => thinking.push(part),
            ApiResponseBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                id,
                name,
                arguments: input.to_string(),
            }),
            ApiResponseBlock::Unknown => {}
        }
    }

    Ok(ChatResponse {
        provider: ProviderId::ANTHROPIC,
        model: parsed
            .model
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| requested_model.to_string()),
        text,
        tool_calls,
        thinking: (!thinking.is_empty()).then(|| thinking.join("\n")),
        stop_reason: parse_stop_reason(parsed.stop_reason.as_deref()),
        usage: parsed.usage.map(Into::into).unwrap_or_default(),
        raw,
    })
}
