//! Anthropic messages API payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    ChatRequest, Message, ProviderError, Role, StopReason, TokenUsage, ToolCall, ToolDefinition,
    ToolMode,
};

/// Request-independent knobs the adapter applies while translating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TranslationDefaults {
    pub max_tokens: u32,
    pub thinking_budget: u32,
}

pub(crate) fn build_api_request<'a>(
    request: &'a ChatRequest,
    defaults: TranslationDefaults,
) -> Result<ApiRequest<'a>, ProviderError> {
    let system = request
        .messages
        .iter()
        .filter(|message| message.role == Role::System)
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>();

    let messages = request
        .messages
        .iter()
        .filter(|message| message.role != Role::System)
        .map(ApiMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let mut max_tokens = request.options.max_tokens.unwrap_or(defaults.max_tokens);
    let thinking = request.thinking.then(|| {
        if max_tokens <= defaults.thinking_budget {
            max_tokens = defaults.thinking_budget.saturating_add(defaults.max_tokens);
        }

        ApiThinking {
            r#type: "enabled",
            budget_tokens: defaults.thinking_budget,
        }
    });

    let (tools, tool_choice) = if request.has_tools() {
        (
            Some(request.tools.iter().map(ApiTool::from).collect()),
            request.tool_mode.map(ApiToolChoice::from),
        )
    } else {
        (None, None)
    };

    Ok(ApiRequest {
        model: &request.model,
        max_tokens,
        system: (!system.is_empty()).then(|| system.join("\n")),
        messages,
        tools,
        tool_choice,
        temperature: request
            .options
            .temperature
            .filter(|_| thinking.is_none()),
        thinking,
    })
}

pub(crate) fn parse_stop_reason(value: Option<&str>) -> StopReason {
    match value {
        Some("end_turn" | "stop_sequence") => StopReason::EndTurn,
        Some("max_tokens") => StopReason::MaxTokens,
        Some("tool_use") => StopReason::ToolUse,
        _ => StopReason::Other,
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ApiTool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ApiToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ApiThinking>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiMessage<'a> {
    pub role: &'static str,
    pub content: ApiContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum ApiContent<'a> {
    Text(&'a str),
    Blocks(Vec<ApiContentBlock<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ApiContentBlock<'a> {
    Text {
        text: &'a str,
    },
    ToolUse {
        id: &'a str,
        name: &'a str,
        input: Value,
    },
    ToolResult {
        tool_use_id: &'a str,
        content: &'a str,
    },
}

impl<'a> TryFrom<&'a Message> for ApiMessage<'a> {
    type Error = ProviderError;

    fn try_from(value: &'a Message) -> Result<Self, Self::Error> {
        let message = match value.role {
            Role::Tool => Self {
                role: "user",
                content: ApiContent::Blocks(vec![ApiContentBlock::ToolResult {
                    tool_use_id: value.tool_call_id.as_deref().unwrap_or_default(),
                    content: &value.content,
                }]),
            },
            Role::Assistant if !value.tool_calls.is_empty() => {
                let mut blocks = Vec::with_capacity(value.tool_calls.len() + 1);
                if !value.content.is_empty() {
                    blocks.push(ApiContentBlock::Text {
                        text: &value.content,
                    });
                }

                for call in &value.tool_calls {
                    blocks.push(ApiContentBlock::ToolUse {
                        id: &call.id,
                        name: &call.name,
                        input: tool_input(call)?,
                    });
                }

                Self {
                    role: "assistant",
                    content: ApiContent::Blocks(blocks),
                }
            }
            Role::Assistant => Self {
                role: "assistant",
                content: ApiContent::Text(&value.content),
            },
            Role::User | Role::System => Self {
                role: "user",
                content: ApiContent::Text(&value.content),
            },
        };

        Ok(message)
    }
}

fn tool_input(call: &ToolCall) -> Result<Value, ProviderError> {
    if call.arguments.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_str(&call.arguments).map_err(|_| {
        ProviderError::invalid_request(format!(
            "arguments of tool call '{}' must be valid JSON",
            call.id
        ))
    })
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiTool<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub input_schema: &'a Value,
}

impl<'a> From<&'a ToolDefinition> for ApiTool<'a> {
    fn from(value: &'a ToolDefinition) -> Self {
        Self {
            name: &value.name,
            description: value.description.as_deref(),
            input_schema: &value.input_schema,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiToolChoice {
    pub r#type: &'static str,
}

impl From<ToolMode> for ApiToolChoice {
    fn from(value: ToolMode) -> Self {
        let r#type = match value {
            ToolMode::Auto => "auto",
            ToolMode::Required => "any",
            ToolMode::None => "none",
        };

        Self { r#type }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiThinking {
    pub r#type: &'static str,
    pub budget_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub content: Vec<ApiResponseBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ApiResponseBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct ApiUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

impl From<ApiUsage> for TokenUsage {
    fn from(value: ApiUsage) -> Self {
        TokenUsage::new(value.input_tokens, value.output_tokens)
    }
}
