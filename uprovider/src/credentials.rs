//! In-memory API key handling.

use crate::{ProviderError, ProviderId};

/// An API key that never appears in `Debug` output and is zeroed on drop.
#[derive(PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Rejects blank keys for `provider`.
    pub fn api_key(provider: &ProviderId, value: impl Into<String>) -> Result<Self, ProviderError> {
        let secret = Self::new(value.into().trim());
        if secret.is_empty() {
            return Err(ProviderError::authentication("api key must not be empty")
                .with_provider(provider.clone()));
        }

        Ok(secret)
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = SecretString::new("sk-live-123");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-live-123");
    }

    #[test]
    fn blank_api_key_is_an_authentication_error() {
        let err = SecretString::api_key(&ProviderId::ANTHROPIC, "   ")
            .expect_err("blank key should fail");
        assert_eq!(err.kind, crate::ProviderErrorKind::Authentication);
        assert_eq!(err.provider, Some(ProviderId::ANTHROPIC));
    }
}
