//! Static capability descriptors and the pre-dispatch capability gate.
//!
//! ```rust
//! use uprovider::{
//!     AllowedTools, CapabilityDescriptor, ChatRequest, Feature, LlmError, Message, ProviderId,
//!     Role, ToolDefinition, ensure_capabilities,
//! };
//!
//! let descriptor = CapabilityDescriptor::new()
//!     .with_streaming(true)
//!     .with_tools(AllowedTools::only(["search"]));
//!
//! let request = ChatRequest::new(ProviderId::OPENAI, "gpt", vec![Message::new(Role::User, "hi")])
//!     .with_tools(vec![ToolDefinition::new("calculator")]);
//!
//! let err = ensure_capabilities(&ProviderId::OPENAI, &descriptor, &request)
//!     .expect_err("calculator is not allowed");
//! assert!(matches!(err, LlmError::ToolNotAvailable { .. }));
//! assert!(!descriptor.supports(Feature::Thinking));
//! ```

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use crate::{ChatRequest, LlmError, ProviderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Chat,
    Streaming,
    Tools,
    Thinking,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Streaming => "streaming",
            Self::Tools => "tools",
            Self::Thinking => "thinking",
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tool names a provider accepts once tool calling is supported at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedTools {
    #[default]
    Any,
    Only(BTreeSet<String>),
}

impl AllowedTools {
    /// Builds an allow-list; a `"*"` entry collapses the list to [`AllowedTools::Any`].
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect::<BTreeSet<String>>();
        if names.contains("*") {
            return Self::Any;
        }

        Self::Only(names)
    }

    pub fn permits(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(names) => names.contains(name),
        }
    }
}

/// What a provider adapter can do. Declared once at construction, not discovered at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    pub supports_chat: bool,
    pub supports_streaming: bool,
    pub supports_tools: bool,
    pub supports_thinking: bool,
    pub allowed_tools: AllowedTools,
}

impl Default for CapabilityDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityDescriptor {
    /// Plain chat with no optional features.
    pub fn new() -> Self {
        Self {
            supports_chat: true,
            supports_streaming: false,
            supports_tools: false,
            supports_thinking: false,
            allowed_tools: AllowedTools::Any,
        }
    }

    pub fn with_chat(mut self, supported: bool) -> Self {
        self.supports_chat = supported;
        self
    }

    pub fn with_streaming(mut self, supported: bool) -> Self {
        self.supports_streaming = supported;
        self
    }

    /// Enables tool calling restricted to `allowed_tools`.
    pub fn with_tools(mut self, allowed_tools: AllowedTools) -> Self {
        self.supports_tools = true;
        self.allowed_tools = allowed_tools;
        self
    }

    pub fn without_tools(mut self) -> Self {
        self.supports_tools = false;
        self
    }

    pub fn with_thinking(mut self, supported: bool) -> Self {
        self.supports_thinking = supported;
        self
    }

    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::Chat => self.supports_chat,
            Feature::Streaming => self.supports_streaming,
            Feature::Tools => self.supports_tools,
            Feature::Thinking => self.supports_thinking,
        }
    }
}

/// Rejects a request that asks `provider` for something its descriptor does not declare.
///
/// Checks run in a fixed order and stop at the first violation: chat, streaming, blanket
/// tool support, per-name tool allowance, thinking.
pub fn ensure_capabilities(
    provider: &ProviderId,
    descriptor: &CapabilityDescriptor,
    request: &ChatRequest,
) -> Result<(), LlmError> {
    let unsupported = |feature| LlmError::unsupported_feature(provider.clone(), feature);

    if !descriptor.supports_chat {
        return Err(unsupported(Feature::Chat));
    }

    if request.stream && !descriptor.supports_streaming {
        return Err(unsupported(Feature::Streaming));
    }

    if request.has_tools() {
        if !descriptor.supports_tools {
            return Err(unsupported(Feature::Tools));
        }

        let missing = request
            .tool_names()
            .filter(|name| !descriptor.allowed_tools.permits(name))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(LlmError::tool_not_available(provider.clone(), missing));
        }
    }

    if request.thinking && !descriptor.supports_thinking {
        return Err(unsupported(Feature::Thinking));
    }

    Ok(())
}
