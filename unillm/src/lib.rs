//! One normalized chat API over OpenAI, Anthropic and Together.
//!
//! This crate is the single dependency for most applications. It re-exports the workspace
//! crates and adds environment-driven client construction plus message helpers.
//!
//! ```rust,no_run
//! use unillm::{ProviderId, chat_request, client_from_env, user_message};
//!
//! # async fn run() -> Result<(), unillm::LlmError> {
//! let client = client_from_env()?;
//! let response = client
//!     .chat(chat_request(
//!         ProviderId::OPENAI,
//!         "gpt-4o-mini",
//!         vec![user_message("Say hello")],
//!     ))
//!     .await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```

mod config;
mod macros;
mod providers;

pub mod prelude;
pub mod util;

pub use ucommon;
pub use uclient;
pub use uobserve;
pub use uprovider;

pub use config::{ClientConfig, DEFAULT_TIMEOUT_SECS, ProviderConfig, parse_allowed_tools};
pub use providers::{build_client, build_client_with, client_from_env, default_hooks};
pub use ucommon::{BoxFuture, GenerationOptions, MetadataMap};
pub use uclient::{DispatchHooks, LlmClient, LlmClientBuilder, NoopDispatchHooks, Operation};
pub use uobserve::{
    FanoutDispatchHooks, MetricsDispatchHooks, SafeDispatchHooks, TracingDispatchHooks,
};
pub use uprovider::{
    AllowedTools, CapabilityDescriptor, ChatRequest, ChatRequestBuilder, ChatResponse,
    EventStream, Feature, HttpTransport, LlmError, Message, ProviderAdapter, ProviderError,
    ProviderErrorKind, ProviderId, Role, SecretString, StopReason, StreamAccumulator, StreamEvent,
    StreamOutcome, TokenUsage, ToolCall, ToolCallDelta, ToolDefinition, ToolMode,
};
pub use util::{
    assistant_message, chat_request, parse_provider_id, system_message, tool_message,
    user_message,
};
