//! Provider-agnostic request, response, and message model types.
//!
//! ```rust
//! use uprovider::{ChatRequest, Message, ProviderId, Role, ToolDefinition, ToolMode};
//!
//! let request = ChatRequest::builder(ProviderId::OPENAI, "gpt-4o-mini")
//!     .message(Message::new(Role::System, "Be brief."))
//!     .message(Message::new(Role::User, "Summarize this diff"))
//!     .tools(vec![ToolDefinition::new("lookup")])
//!     .build()
//!     .expect("request should be valid");
//!
//! assert_eq!(request.messages.len(), 2);
//! assert_eq!(request.tool_mode, Some(ToolMode::Auto));
//!
//! let err = ChatRequest::new(ProviderId::OPENAI, "", vec![Message::new(Role::User, "hi")])
//!     .validate()
//!     .expect_err("empty model should fail");
//! assert!(err.to_string().contains("model must not be empty"));
//! ```

use std::borrow::{Borrow, Cow};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use serde_json::{Value, json};
use ucommon::{GenerationOptions, MetadataMap};

use crate::LlmError;

/// Identifier a provider adapter is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(Cow<'static, str>);

impl ProviderId {
    pub const OPENAI: Self = Self(Cow::Borrowed("openai"));
    pub const ANTHROPIC: Self = Self(Cow::Borrowed("anthropic"));
    pub const TOGETHER: Self = Self(Cow::Borrowed("together"));

    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProviderId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Set on `Role::Tool` messages: the call this message answers.
    pub tool_call_id: Option<String>,
    /// Set on `Role::Assistant` messages that invoked tools.
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }

    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_input_schema(mut self, input_schema: Value) -> Self {
        self.input_schema = input_schema;
        self
    }
}

/// How strongly the model is steered toward calling one of the offered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolMode {
    Auto,
    Required,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    Cancelled,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }
}

/// Normalized result of one non-streaming call, or the aggregate of one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub provider: ProviderId,
    pub model: String,
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub thinking: Option<String>,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
    /// Vendor body for non-streaming calls; `Value::Null` for stream aggregates.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub provider: ProviderId,
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub tool_mode: Option<ToolMode>,
    pub thinking: bool,
    pub stream: bool,
    pub options: GenerationOptions,
    pub metadata: MetadataMap,
}

impl ChatRequest {
    pub fn builder(provider: ProviderId, model: impl Into<String>) -> ChatRequestBuilder {
        ChatRequestBuilder::new(provider, model)
    }

    pub fn new(provider: ProviderId, model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            provider,
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_mode: None,
            thinking: false,
            stream: false,
            options: GenerationOptions::default(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options = self.options.with_temperature(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options = self.options.with_max_tokens(max_tokens);
        self
    }

    /// Attaches tools; the tool mode defaults to [`ToolMode::Auto`] when unset.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        if !tools.is_empty() && self.tool_mode.is_none() {
            self.tool_mode = Some(ToolMode::Auto);
        }
        self.tools = tools;
        self
    }

    pub fn with_tool_mode(mut self, tool_mode: ToolMode) -> Self {
        self.tool_mode = Some(tool_mode);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn enable_thinking(mut self) -> Self {
        self.thinking = true;
        self
    }

    pub fn enable_streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|tool| tool.name.as_str())
    }

    /// Checks the request's own shape. Capability checks live in [`crate::ensure_capabilities`].
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.model.trim().is_empty() {
            return Err(LlmError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(LlmError::invalid_request("at least one message is required"));
        }

        let orphan_tool_result = self.messages.iter().any(|message| {
            message.role == Role::Tool
                && message
                    .tool_call_id
                    .as_deref()
                    .is_none_or(|id| id.trim().is_empty())
        });
        if orphan_tool_result {
            return Err(LlmError::invalid_request(
                "tool messages must carry a tool_call_id",
            ));
        }

        if self.has_tools() && self.tool_mode.is_none() {
            return Err(LlmError::invalid_request(
                "tool_mode must be set when tools are provided",
            ));
        }

        let mut seen = HashSet::new();
        for name in self.tool_names() {
            if name.trim().is_empty() {
                return Err(LlmError::invalid_request("tool name must not be empty"));
            }

            if !seen.insert(name) {
                return Err(LlmError::invalid_request(format!(
                    "duplicate tool name '{name}'"
                )));
            }
        }

        if let Some(max_tokens) = self.options.max_tokens
            && max_tokens == 0
        {
            return Err(LlmError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(LlmError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequestBuilder {
    request: ChatRequest,
}

impl ChatRequestBuilder {
    pub fn new(provider: ProviderId, model: impl Into<String>) -> Self {
        Self {
            request: ChatRequest::new(provider, model, Vec::new()),
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.request.messages.extend(messages);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.options = self.request.options.with_temperature(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.request.options = self.request.options.with_max_tokens(max_tokens);
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.request = self.request.with_tools(tools);
        self
    }

    pub fn tool_mode(mut self, tool_mode: ToolMode) -> Self {
        self.request.tool_mode = Some(tool_mode);
        self
    }

    pub fn thinking(mut self, thinking: bool) -> Self {
        self.request.thinking = thinking;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.metadata.insert(key.into(), value.into());
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.request.stream = stream;
        self
    }

    pub fn enable_streaming(self) -> Self {
        self.streaming(true)
    }

    pub fn build(self) -> Result<ChatRequest, LlmError> {
        self.request.validate()?;
        Ok(self.request)
    }
}
