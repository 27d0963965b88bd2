//! Client construction from a [`ClientConfig`].

use std::sync::Arc;

use uclient::{DispatchHooks, LlmClient, LlmClientBuilder};
use uobserve::{FanoutDispatchHooks, MetricsDispatchHooks, SafeDispatchHooks, TracingDispatchHooks};
use uprovider::{HttpTransport, LlmError, ReqwestTransport};

use crate::{ClientConfig, ProviderConfig};

/// Tracing and metrics hooks, each isolated from panics.
pub fn default_hooks() -> Arc<dyn DispatchHooks> {
    Arc::new(
        FanoutDispatchHooks::new()
            .with(SafeDispatchHooks::new(TracingDispatchHooks))
            .with(SafeDispatchHooks::new(MetricsDispatchHooks)),
    )
}

/// Builds a client over a reqwest transport with `config.timeout` and the default hooks.
pub fn build_client(config: &ClientConfig) -> Result<LlmClient, LlmError> {
    let transport = ReqwestTransport::with_timeout(config.timeout)?;
    build_client_with(config, Arc::new(transport), default_hooks())
}

/// Reads [`ClientConfig::from_env`] and builds a client from it.
pub fn client_from_env() -> Result<LlmClient, LlmError> {
    build_client(&ClientConfig::from_env()?)
}

/// Registers every configured provider over `transport`.
pub fn build_client_with(
    config: &ClientConfig,
    transport: Arc<dyn HttpTransport>,
    hooks: Arc<dyn DispatchHooks>,
) -> Result<LlmClient, LlmError> {
    let mut builder = LlmClient::builder().hooks(hooks);

    if let Some(openai) = &config.openai {
        builder = register_openai(builder, openai, Arc::clone(&transport))?;
    }
    if let Some(anthropic) = &config.anthropic {
        builder = register_anthropic(builder, anthropic, config, Arc::clone(&transport))?;
    }
    if let Some(together) = &config.together {
        builder = register_together(builder, together, transport)?;
    }

    let client = builder.build()?;
    tracing::info!(
        providers = ?client.providers(),
        timeout_secs = config.timeout.as_secs(),
        "unillm client ready"
    );
    Ok(client)
}

#[cfg(feature = "provider-openai")]
fn register_openai(
    builder: LlmClientBuilder,
    config: &ProviderConfig,
    transport: Arc<dyn HttpTransport>,
) -> Result<LlmClientBuilder, LlmError> {
    let mut adapter = uprovider::OpenAiAdapter::new(config.api_key.clone(), transport);
    if let Some(base_url) = &config.base_url {
        adapter = adapter.with_base_url(base_url.clone());
    }
    if let Some(allowed_tools) = &config.allowed_tools {
        adapter = adapter.with_allowed_tools(allowed_tools.clone());
    }

    Ok(builder.adapter(adapter))
}

#[cfg(not(feature = "provider-openai"))]
fn register_openai(
    _builder: LlmClientBuilder,
    _config: &ProviderConfig,
    _transport: Arc<dyn HttpTransport>,
) -> Result<LlmClientBuilder, LlmError> {
    Err(LlmError::configuration(
        "provider-openai feature is not enabled on unillm",
    ))
}

#[cfg(feature = "provider-anthropic")]
fn register_anthropic(
    builder: LlmClientBuilder,
    config: &ProviderConfig,
    client: &ClientConfig,
    transport: Arc<dyn HttpTransport>,
) -> Result<LlmClientBuilder, LlmError> {
    let mut adapter = uprovider::AnthropicAdapter::new(config.api_key.clone(), transport);
    if let Some(base_url) = &config.base_url {
        adapter = adapter.with_base_url(base_url.clone());
    }
    if let Some(allowed_tools) = &config.allowed_tools {
        adapter = adapter.with_allowed_tools(allowed_tools.clone());
    }
    if let Some(max_tokens) = client.anthropic_max_tokens {
        adapter = adapter.with_default_max_tokens(max_tokens);
    }
    if let Some(budget) = client.anthropic_thinking_budget {
        adapter = adapter.with_thinking_budget(budget);
    }

    Ok(builder.adapter(adapter))
}

#[cfg(not(feature = "provider-anthropic"))]
fn register_anthropic(
    _builder: LlmClientBuilder,
    _config: &ProviderConfig,
    _client: &ClientConfig,
    _transport: Arc<dyn HttpTransport>,
) -> Result<LlmClientBuilder, LlmError> {
    Err(LlmError::configuration(
        "provider-anthropic feature is not enabled on unillm",
    ))
}

#[cfg(feature = "provider-together")]
fn register_together(
    builder: LlmClientBuilder,
    config: &ProviderConfig,
    transport: Arc<dyn HttpTransport>,
) -> Result<LlmClientBuilder, LlmError> {
    let mut adapter = uprovider::TogetherAdapter::new(config.api_key.clone(), transport);
    if let Some(base_url) = &config.base_url {
        adapter = adapter.with_base_url(base_url.clone());
    }

    Ok(builder.adapter(adapter))
}

#[cfg(not(feature = "provider-together"))]
fn register_together(
    _builder: LlmClientBuilder,
    _config: &ProviderConfig,
    _transport: Arc<dyn HttpTransport>,
) -> Result<LlmClientBuilder, LlmError> {
    Err(LlmError::configuration(
        "provider-together feature is not enabled on unillm",
    ))
}
