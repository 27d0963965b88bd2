//! Vendor-call failures and the caller-facing dispatch error taxonomy.
//!
//! ```rust
//! use uprovider::{LlmError, ProviderError, ProviderErrorKind, ProviderId};
//!
//! let auth = ProviderError::from_status(401, "bad key");
//! assert_eq!(auth.kind, ProviderErrorKind::Authentication);
//! assert_eq!(auth.status, Some(401));
//! assert!(!auth.retryable);
//!
//! let err = LlmError::tool_not_available(ProviderId::OPENAI, ["b", "a", "b"]);
//! assert_eq!(err.to_string(), "openai: tool(s) not available: a, b");
//! ```

use thiserror::Error;

use crate::{Feature, ProviderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    /// The vendor answered, but the payload could not be understood.
    Decode,
    Unsupported,
    Other,
}

/// A failed vendor call, raised only after dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}{}", prefix(.provider, .kind), .message, status_suffix(.status))]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub provider: Option<ProviderId>,
    pub message: String,
    pub status: Option<u16>,
    pub retryable: bool,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            provider: None,
            message: message.into(),
            status: None,
            retryable,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Authentication, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message, true)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message, true)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message, true)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Decode, message, false)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unsupported, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message, false)
    }

    /// Classifies a non-success HTTP status returned by a vendor.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let error = match status {
            401 | 403 => Self::authentication(message),
            429 => Self::rate_limited(message),
            408 | 504 => Self::timeout(message),
            400 | 404 | 413 | 422 => Self::invalid_request(message),
            502 | 503 | 529 => Self::unavailable(message),
            _ => Self::transport(message),
        };

        error.with_status(status)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }
}

fn prefix(provider: &Option<ProviderId>, kind: &ProviderErrorKind) -> String {
    match provider {
        Some(provider) => format!("{provider}: "),
        None => format!("{kind:?}: "),
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (status {code})"))
        .unwrap_or_default()
}

/// Everything a caller of the dispatcher can observe going wrong.
///
/// All variants except [`LlmError::Provider`] are raised before any network access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("provider '{0}' is not available")]
    UnsupportedProvider(ProviderId),

    #[error("feature '{feature}' is not supported by provider '{provider}'")]
    UnsupportedFeature {
        provider: ProviderId,
        feature: Feature,
    },

    #[error("{provider}: tool(s) not available: {}", .tools.join(", "))]
    ToolNotAvailable {
        provider: ProviderId,
        tools: Vec<String>,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl LlmError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn unsupported_feature(provider: ProviderId, feature: Feature) -> Self {
        Self::UnsupportedFeature { provider, feature }
    }

    /// Builds a `ToolNotAvailable` error with names sorted and deduplicated.
    pub fn tool_not_available<I, S>(provider: ProviderId, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tools = tools.into_iter().map(Into::into).collect::<Vec<String>>();
        tools.sort();
        tools.dedup();
        Self::ToolNotAvailable { provider, tools }
    }

    /// True for errors produced by request validation rather than by a vendor call.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Provider(_) | Self::Configuration(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider(error) => error.status,
            _ => None,
        }
    }

    /// Stable label used by logs and metrics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::UnsupportedProvider(_) => "unsupported_provider",
            Self::UnsupportedFeature { .. } => "unsupported_feature",
            Self::ToolNotAvailable { .. } => "tool_not_available",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Provider(_) => "provider",
        }
    }
}
