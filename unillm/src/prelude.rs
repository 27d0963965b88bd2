//! Common imports for most unillm applications.

pub use crate::{
    ClientConfig, ProviderConfig, assistant_message, build_client, build_client_with,
    chat_request, client_from_env, default_hooks, parse_provider_id, system_message,
    tool_message, user_message,
};
pub use crate::{unillm_messages, unillm_msg};
pub use uclient::prelude::*;
pub use uobserve::prelude::*;
