//! Small convenience constructors for common types.

use crate::{ChatRequest, Message, ProviderId, Role};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

/// A tool result answering the call with id `tool_call_id`.
pub fn tool_message(tool_call_id: impl Into<String>, content: impl Into<String>) -> Message {
    Message::tool_result(tool_call_id, content)
}

pub fn chat_request(
    provider: ProviderId,
    model: impl Into<String>,
    messages: Vec<Message>,
) -> ChatRequest {
    ChatRequest::new(provider, model, messages)
}

/// Maps common spellings to the built-in provider ids.
pub fn parse_provider_id(value: &str) -> Option<ProviderId> {
    match value.trim().to_ascii_lowercase().as_str() {
        "openai" | "open-ai" | "open_ai" => Some(ProviderId::OPENAI),
        "anthropic" | "claude" => Some(ProviderId::ANTHROPIC),
        "together" | "together-ai" | "together_ai" | "togetherai" => Some(ProviderId::TOGETHER),
        _ => None,
    }
}
