//! Capability-gated dispatch over registered provider adapters.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use uclient::LlmClient;
//! use uprovider::{
//!     ChatRequest, Feature, LlmError, Message, ProviderId, ReqwestTransport, Role,
//!     SecretString, TogetherAdapter, ToolDefinition,
//! };
//!
//! let client = LlmClient::builder()
//!     .adapter(TogetherAdapter::new(
//!         SecretString::new("together-key"),
//!         Arc::new(ReqwestTransport::default()),
//!     ))
//!     .build()
//!     .expect("client should build");
//!
//! let request = ChatRequest::new(
//!     ProviderId::TOGETHER,
//!     "meta-llama/Llama-3-8b-chat-hf",
//!     vec![Message::new(Role::User, "hi")],
//! )
//! .with_tools(vec![ToolDefinition::new("demo_tool")]);
//!
//! assert_eq!(
//!     client.validate(&request),
//!     Err(LlmError::unsupported_feature(ProviderId::TOGETHER, Feature::Tools))
//! );
//! ```

mod client;
mod hooks;

pub mod prelude {
    pub use crate::{DispatchHooks, LlmClient, LlmClientBuilder, NoopDispatchHooks, Operation};
    pub use uprovider::prelude::*;
}

pub use client::{LlmClient, LlmClientBuilder};
pub use hooks::{DispatchHooks, NoopDispatchHooks, Operation};
pub use uprovider::{
    CapabilityDescriptor, ChatRequest, ChatResponse, EventStream, LlmError, ProviderId,
    StreamEvent, StreamOutcome,
};
