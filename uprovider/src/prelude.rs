//! Common `uprovider` imports for downstream crates.

pub use crate::{
    AllowedTools, CapabilityDescriptor, ChatRequest, ChatRequestBuilder, ChatResponse,
    EventStream, Feature, HttpTransport, LlmError, Message, ProviderAdapter, ProviderError,
    ProviderErrorKind, ProviderId, ProviderRegistry, Role, SecretString, StopReason, StreamEvent,
    TokenUsage, ToolCall, ToolCallDelta, ToolDefinition, ToolMode, ensure_capabilities,
};
pub use ucommon::{BoxFuture, GenerationOptions, MetadataMap};
