//! HTTP seam between adapters and the network.
//!
//! Adapters build [`HttpRequest`] values and hand them to an [`HttpTransport`]. The default
//! implementation is [`ReqwestTransport`]; tests substitute recording fakes.

use std::pin::Pin;

use futures_core::Stream;
use serde_json::Value;

use crate::{ProviderError, ProviderFuture};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ProviderError>> + Send>>;

const REDACTED_HEADERS: [&str; 2] = ["authorization", "x-api-key"];

#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl HttpRequest {
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| {
                let shown = if REDACTED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                    "[REDACTED]"
                } else {
                    value.as_str()
                };
                (name.as_str(), shown)
            })
            .collect::<Vec<_>>();

        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct HttpStreamResponse {
    pub status: u16,
    pub chunks: ByteStream,
}

impl HttpStreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl std::fmt::Debug for HttpStreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStreamResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

pub trait HttpTransport: Send + Sync {
    /// Sends a JSON POST and buffers the whole response body.
    fn send<'a>(&'a self, request: HttpRequest)
    -> ProviderFuture<'a, Result<HttpResponse, ProviderError>>;

    /// Sends a JSON POST and returns the response body as a chunk stream.
    fn open_stream<'a>(
        &'a self,
        request: HttpRequest,
    ) -> ProviderFuture<'a, Result<HttpStreamResponse, ProviderError>>;
}

/// Drains a failed stream response into its body text.
pub async fn read_to_string(mut chunks: ByteStream) -> String {
    use futures_util::StreamExt;

    let mut body = Vec::new();
    while let Some(Ok(chunk)) = chunks.next().await {
        body.extend_from_slice(&chunk);
    }

    String::from_utf8_lossy(&body).into_owned()
}

#[cfg(feature = "http-transport")]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(feature = "http-transport")]
impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Builds a client that gives up when connecting, or waiting between body chunks,
    /// takes longer than `timeout`. Long streams that keep producing data are not cut off.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|err| ProviderError::transport(err.to_string()))?;

        Ok(Self::new(client))
    }

    fn request(&self, request: &HttpRequest) -> reqwest::RequestBuilder {
        request
            .headers
            .iter()
            .fold(self.client.post(&request.url).json(&request.body), |builder, (name, value)| {
                builder.header(name, value)
            })
    }
}

#[cfg(feature = "http-transport")]
impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[cfg(feature = "http-transport")]
fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(err.to_string())
    } else {
        ProviderError::transport(err.to_string())
    }
}

#[cfg(feature = "http-transport")]
impl HttpTransport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
    ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
        Box::pin(async move {
            let response = self.request(&request).send().await.map_err(map_reqwest_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(map_reqwest_error)?;

            Ok(HttpResponse { status, body })
        })
    }

    fn open_stream<'a>(
        &'a self,
        request: HttpRequest,
    ) -> ProviderFuture<'a, Result<HttpStreamResponse, ProviderError>> {
        use futures_util::StreamExt;

        Box::pin(async move {
            let response = self
                .request(&request)
                .header("Accept", "text/event-stream")
                .send()
                .await
                .map_err(map_reqwest_error)?;
            let status = response.status().as_u16();
            let chunks = response
                .bytes_stream()
                .map(|item| item.map(|bytes| bytes.to_vec()).map_err(map_reqwest_error));

            Ok(HttpStreamResponse {
                status,
                chunks: Box::pin(chunks),
            })
        })
    }
}
