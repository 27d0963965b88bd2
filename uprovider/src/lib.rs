//! Provider adapters, capability descriptors and stream normalization.
//!
//! Every vendor sits behind [`ProviderAdapter`]: one normalized [`ChatRequest`] in, one
//! [`ChatResponse`] or one [`EventStream`] of [`StreamEvent`]s out. Each adapter declares a
//! static [`CapabilityDescriptor`] that [`ensure_capabilities`] checks before any network call.
//!
//! ```rust
//! use uprovider::{CapabilityDescriptor, ChatRequest, Message, ProviderId, Role, ensure_capabilities};
//!
//! let request = ChatRequest::new(ProviderId::ANTHROPIC, "claude", vec![Message::new(Role::User, "hi")])
//!     .enable_streaming();
//!
//! let anthropic = CapabilityDescriptor::new().with_thinking(true);
//! assert!(ensure_capabilities(&ProviderId::ANTHROPIC, &anthropic, &request).is_err());
//! ```

pub mod adapters;
mod capability;
mod credentials;
mod error;
mod model;
pub mod prelude;
mod provider;
mod registry;
mod sse;
mod stream;
mod transport;

pub use capability::{AllowedTools, CapabilityDescriptor, Feature, ensure_capabilities};
pub use credentials::SecretString;
pub use error::{LlmError, ProviderError, ProviderErrorKind};
pub use model::{
    ChatRequest, ChatRequestBuilder, ChatResponse, Message, ProviderId, Role, StopReason,
    TokenUsage, ToolCall, ToolDefinition, ToolMode,
};
pub use provider::{ProviderAdapter, ProviderFuture};
pub use registry::ProviderRegistry;
pub use sse::{SseDecoder, SsePayload};
pub use stream::{
    EventStream, RawEventStream, StreamAccumulator, StreamEvent, StreamOutcome, StreamState,
    ToolCallDelta, VecEventStream,
};
#[cfg(feature = "http-transport")]
pub use transport::ReqwestTransport;
pub use transport::{
    ByteStream, HttpRequest, HttpResponse, HttpStreamResponse, HttpTransport, read_to_string,
};
pub use ucommon::{BoxFuture, GenerationOptions, MetadataMap};

#[cfg(feature = "provider-anthropic")]
pub use adapters::anthropic::AnthropicAdapter;
#[cfg(feature = "provider-openai")]
pub use adapters::openai::OpenAiAdapter;
#[cfg(feature = "provider-together")]
pub use adapters::together::TogetherAdapter;
