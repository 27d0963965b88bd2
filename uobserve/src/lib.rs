//! Observability hooks for the unillm dispatcher.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use uclient::LlmClient;
//! use uobserve::{FanoutDispatchHooks, MetricsDispatchHooks, SafeDispatchHooks, TracingDispatchHooks};
//!
//! let hooks = FanoutDispatchHooks::new()
//!     .with(SafeDispatchHooks::new(TracingDispatchHooks))
//!     .with(SafeDispatchHooks::new(MetricsDispatchHooks));
//!
//! let client = LlmClient::builder().hooks(Arc::new(hooks)).build();
//! assert!(client.is_ok());
//! ```

mod fanout_hooks;
mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use fanout_hooks::FanoutDispatchHooks;
pub use metrics_hooks::MetricsDispatchHooks;
pub use safe_hooks::SafeDispatchHooks;
pub use tracing_hooks::TracingDispatchHooks;

pub mod prelude {
    pub use crate::{
        FanoutDispatchHooks, MetricsDispatchHooks, SafeDispatchHooks, TracingDispatchHooks,
    };
}
