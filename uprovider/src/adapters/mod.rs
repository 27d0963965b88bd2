use serde_json::Value;

use crate::{ByteStream, HttpRequest, HttpTransport, ProviderError, ProviderId, read_to_string};

#[cfg(any(feature = "provider-openai", feature = "provider-together"))]
pub(crate) mod chat_completions;

#[cfg(feature = "provider-openai")]
pub mod openai;

#[cfg(feature = "provider-together")]
pub mod together;

#[cfg(feature = "provider-anthropic")]
pub mod anthropic;

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Pulls the human-readable message out of a vendor error body.
///
/// Accepts `{"error":{"message":..}}`, `{"error":".."}` and `{"message":..}`.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<Value>(body).ok()?;
    let message = match parsed.get("error") {
        Some(Value::Object(error)) => error.get("message"),
        Some(error @ Value::String(_)) => Some(error),
        _ => parsed.get("message"),
    };

    message
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|message| !message.trim().is_empty())
}

/// Builds the error for a non-success vendor status, preferring the vendor's own message.
pub(crate) fn status_error(provider: &ProviderId, status: u16, body: &str) -> ProviderError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "request failed".to_string()
        } else {
            body.to_string()
        }
    });

    ProviderError::from_status(status, message).with_provider(provider.clone())
}

/// Sends one non-streaming call and returns the body of a successful response.
pub(crate) async fn send_checked(
    transport: &dyn HttpTransport,
    request: HttpRequest,
    provider: &ProviderId,
) -> Result<String, ProviderError> {
    let response = transport
        .send(request)
        .await
        .map_err(|err| err.with_provider(provider.clone()))?;

    if !response.is_success() {
        return Err(status_error(provider, response.status, &response.body));
    }

    Ok(response.body)
}

/// Opens one streaming call; a non-success status is drained and reported as an error.
pub(crate) async fn open_checked(
    transport: &dyn HttpTransport,
    request: HttpRequest,
    provider: &ProviderId,
) -> Result<ByteStream, ProviderError> {
    let response = transport
        .open_stream(request)
        .await
        .map_err(|err| err.with_provider(provider.clone()))?;

    if !response.is_success() {
        let body = read_to_string(response.chunks).await;
        return Err(status_error(provider, response.status, &body));
    }

    Ok(response.chunks)
}
