#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use futures_util::stream;
use serde_json::Value;
use uprovider::{
    ByteStream, HttpRequest, HttpResponse, HttpStreamResponse, HttpTransport, ProviderError,
    ProviderFuture,
};

type StreamReply = Result<(u16, Vec<Result<Vec<u8>, ProviderError>>), ProviderError>;

/// Records every request and answers from canned replies in order.
#[derive(Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, ProviderError>>>,
    streams: Mutex<VecDeque<StreamReply>>,
}

impl FakeTransport {
    pub fn responding(status: u16, body: Value) -> Self {
        Self::responding_raw(status, body.to_string())
    }

    pub fn responding_raw(status: u16, body: impl Into<String>) -> Self {
        let transport = Self::default();
        transport
            .responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(HttpResponse {
                status,
                body: body.into(),
            }));
        transport
    }

    pub fn failing(error: ProviderError) -> Self {
        let transport = Self::default();
        transport
            .responses
            .lock()
            .expect("responses lock")
            .push_back(Err(error.clone()));
        transport
            .streams
            .lock()
            .expect("streams lock")
            .push_back(Err(error));
        transport
    }

    /// Serves an SSE body split into the given chunks.
    pub fn streaming(status: u16, chunks: &[&str]) -> Self {
        Self::streaming_items(
            status,
            chunks
                .iter()
                .map(|chunk| Ok(chunk.as_bytes().to_vec()))
                .collect(),
        )
    }

    pub fn streaming_items(status: u16, items: Vec<Result<Vec<u8>, ProviderError>>) -> Self {
        let transport = Self::default();
        transport
            .streams
            .lock()
            .expect("streams lock")
            .push_back(Ok((status, items)));
        transport
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub fn last_body(&self) -> Value {
        self.requests()
            .last()
            .map(|request| request.body.clone())
            .expect("a request should have been sent")
    }

    fn record(&self, request: HttpRequest) {
        self.requests.lock().expect("requests lock").push(request);
    }
}

impl HttpTransport for FakeTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
    ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
        Box::pin(async move {
            self.record(request);
            self.responses
                .lock()
                .expect("responses lock")
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::other("no canned response")))
        })
    }

    fn open_stream<'a>(
        &'a self,
        request: HttpRequest,
    ) -> ProviderFuture<'a, Result<HttpStreamResponse, ProviderError>> {
        Box::pin(async move {
            self.record(request);
            let (status, items) = self
                .streams
                .lock()
                .expect("streams lock")
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::other("no canned stream")))?;

            Ok(HttpStreamResponse {
                status,
                chunks: Box::pin(stream::iter(items)) as ByteStream,
            })
        })
    }
}

/// Formats JSON payloads as SSE `data:` lines followed by the `[DONE]` sentinel.
pub fn sse_body(payloads: &[Value]) -> String {
    let mut body = payloads
        .iter()
        .map(|payload| format!("data: {payload}\n\n"))
        .collect::<String>();
    body.push_str("data: [DONE]\n\n");
    body
}
