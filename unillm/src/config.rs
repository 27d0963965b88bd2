//! Environment-driven client configuration.
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! use unillm::ClientConfig;
//!
//! let env = HashMap::from([
//!     ("OPENAI_API_KEY", "sk-test"),
//!     ("OPENAI_ALLOWED_TOOLS", "search, calculator"),
//!     ("UNILLM_TIMEOUT_SECS", "15"),
//! ]);
//!
//! let config = ClientConfig::from_lookup(|name| env.get(name).map(|value| value.to_string()))
//!     .expect("config should load");
//! assert!(config.openai.is_some());
//! assert!(config.anthropic.is_none());
//! assert_eq!(config.timeout, Duration::from_secs(15));
//! ```

use std::time::Duration;

use uprovider::{AllowedTools, LlmError, SecretString};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const TIMEOUT_VAR: &str = "UNILLM_TIMEOUT_SECS";

/// Settings for one vendor. A provider without a config is simply not registered.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: SecretString,
    pub base_url: Option<String>,
    pub allowed_tools: Option<AllowedTools>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            base_url: None,
            allowed_tools: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_allowed_tools(mut self, allowed_tools: AllowedTools) -> Self {
        self.allowed_tools = Some(allowed_tools);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub openai: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
    pub together: Option<ProviderConfig>,
    pub anthropic_max_tokens: Option<u32>,
    pub anthropic_thinking_budget: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            openai: None,
            anthropic: None,
            together: None,
            anthropic_max_tokens: None,
            anthropic_thinking_budget: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the process environment.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which returns `None` for unset variables.
    ///
    /// Recognized variables: `{OPENAI,ANTHROPIC,TOGETHER}_API_KEY`, `{..}_BASE_URL`,
    /// `OPENAI_ALLOWED_TOOLS`, `ANTHROPIC_ALLOWED_TOOLS`, `ANTHROPIC_MAX_TOKENS`,
    /// `ANTHROPIC_THINKING_BUDGET` and `UNILLM_TIMEOUT_SECS`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let timeout = match read(TIMEOUT_VAR) {
            Some(value) => Duration::from_secs(parse_positive(TIMEOUT_VAR, &value)?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let provider = |prefix: &str, tools: bool| {
            read(&format!("{prefix}_API_KEY")).map(|api_key| ProviderConfig {
                api_key: SecretString::new(api_key),
                base_url: read(&format!("{prefix}_BASE_URL")),
                allowed_tools: tools
                    .then(|| read(&format!("{prefix}_ALLOWED_TOOLS")))
                    .flatten()
                    .map(|value| parse_allowed_tools(&value)),
            })
        };

        let anthropic_max_tokens = read("ANTHROPIC_MAX_TOKENS")
            .map(|value| parse_positive("ANTHROPIC_MAX_TOKENS", &value))
            .transpose()?
            .map(|value| to_u32("ANTHROPIC_MAX_TOKENS", value))
            .transpose()?;
        let anthropic_thinking_budget = read("ANTHROPIC_THINKING_BUDGET")
            .map(|value| parse_positive("ANTHROPIC_THINKING_BUDGET", &value))
            .transpose()?
            .map(|value| to_u32("ANTHROPIC_THINKING_BUDGET", value))
            .transpose()?;

        Ok(Self {
            timeout,
            openai: provider("OPENAI", true),
            anthropic: provider("ANTHROPIC", true),
            together: provider("TOGETHER", false),
            anthropic_max_tokens,
            anthropic_thinking_budget,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_openai(mut self, config: ProviderConfig) -> Self {
        self.openai = Some(config);
        self
    }

    pub fn with_anthropic(mut self, config: ProviderConfig) -> Self {
        self.anthropic = Some(config);
        self
    }

    pub fn with_together(mut self, config: ProviderConfig) -> Self {
        self.together = Some(config);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.openai.is_none() && self.anthropic.is_none() && self.together.is_none()
    }
}

/// Splits a comma-separated tool list. `*` anywhere means every tool.
pub fn parse_allowed_tools(value: &str) -> AllowedTools {
    AllowedTools::only(
        value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty()),
    )
}

fn parse_positive(name: &str, value: &str) -> Result<u64, LlmError> {
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(LlmError::configuration(format!(
            "{name} must be a positive integer, got '{value}'"
        ))),
    }
}

fn to_u32(name: &str, value: u64) -> Result<u32, LlmError> {
    u32::try_from(value)
        .map_err(|_| LlmError::configuration(format!("{name} is out of range: {value}")))
}
