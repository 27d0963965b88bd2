//! Chat-completions HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ChatRequest, Message, Role, StopReason, TokenUsage, ToolCall, ToolDefinition, ToolMode};

use super::Dialect;

pub(crate) fn build_api_request<'a>(
    request: &'a ChatRequest,
    dialect: &Dialect,
    stream: bool,
) -> ApiRequest<'a> {
    let send_tools = dialect.tools && request.has_tools();
    let tools = send_tools.then(|| request.tools.iter().map(ApiTool::from).collect());
    let tool_choice = if send_tools {
        request.tool_mode.map(tool_choice)
    } else {
        None
    };

    ApiRequest {
        model: &request.model,
        messages: request.messages.iter().map(ApiMessage::from).collect(),
        tools,
        tool_choice,
        temperature: request.options.temperature,
        max_tokens: request.options.max_tokens,
        stream,
        stream_options: (stream && dialect.stream_usage).then_some(ApiStreamOptions {
            include_usage: true,
        }),
    }
}

fn tool_choice(mode: ToolMode) -> &'static str {
    match mode {
        ToolMode::Auto => "auto",
        ToolMode::Required => "required",
        ToolMode::None => "none",
    }
}

pub(crate) fn parse_finish_reason(value: Option<&str>) -> StopReason {
    match value {
        Some("stop") => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("tool_calls" | "function_call") => StopReason::ToolUse,
        Some("cancelled") => StopReason::Cancelled,
        _ => StopReason::Other,
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ApiTool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<ApiStreamOptions>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiStreamOptions {
    pub include_usage: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiMessage<'a> {
    pub role: &'static str,
    pub content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ApiOutboundToolCall<'a>>,
}

impl<'a> From<&'a Message> for ApiMessage<'a> {
    fn from(value: &'a Message) -> Self {
        // Assistant turns that only call tools carry a null content.
        let content = if value.role == Role::Assistant
            && !value.tool_calls.is_empty()
            && value.content.is_empty()
        {
            None
        } else {
            Some(value.content.as_str())
        };

        Self {
            role: value.role.as_str(),
            content,
            tool_call_id: value.tool_call_id.as_deref(),
            tool_calls: value
                .tool_calls
                .iter()
                .map(ApiOutboundToolCall::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiOutboundToolCall<'a> {
    pub id: &'a str,
    pub r#type: &'static str,
    pub function: ApiOutboundFunctionCall<'a>,
}

impl<'a> From<&'a ToolCall> for ApiOutboundToolCall<'a> {
    fn from(value: &'a ToolCall) -> Self {
        Self {
            id: &value.id,
            r#type: "function",
            function: ApiOutboundFunctionCall {
                name: &value.name,
                arguments: &value.arguments,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiOutboundFunctionCall<'a> {
    pub name: &'a str,
    pub arguments: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiTool<'a> {
    pub r#type: &'static str,
    pub function: ApiFunction<'a>,
}

impl<'a> From<&'a ToolDefinition> for ApiTool<'a> {
    fn from(value: &'a ToolDefinition) -> Self {
        Self {
            r#type: "function",
            function: ApiFunction {
                name: &value.name,
                description: value.description.as_deref(),
                parameters: &value.input_schema,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiFunction<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ApiChoice>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiChoice {
    pub message: ApiAssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiAssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ApiToolCall>>,
}

impl ApiAssistantMessage {
    pub(crate) fn reasoning(&self) -> Option<&str> {
        self.reasoning_content
            .as_deref()
            .or(self.reasoning.as_deref())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiToolCall {
    pub id: String,
    pub function: ApiToolFunction,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiToolFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl From<ApiToolCall> for ToolCall {
    fn from(value: ApiToolCall) -> Self {
        Self {
            id: value.id,
            name: value.function.name,
            arguments: value.function.arguments,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct ApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl From<ApiUsage> for TokenUsage {
    fn from(value: ApiUsage) -> Self {
        TokenUsage::new(value.prompt_tokens, value.completion_tokens)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiStreamChunk {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ApiStreamChoice>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiStreamChoice {
    #[serde(default)]
    pub delta: Option<ApiStreamDelta>,
    /// Some OpenAI-compatible hosts send whole messages instead of deltas.
    #[serde(default)]
    pub message: Option<ApiAssistantMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiStreamDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ApiDeltaToolCall>>,
}

impl ApiStreamDelta {
    pub(crate) fn reasoning(&self) -> Option<&str> {
        self.reasoning_content
            .as_deref()
            .or(self.reasoning.as_deref())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiDeltaToolCall {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<ApiDeltaToolFunction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiDeltaToolFunction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub message: Option<String>,
}
