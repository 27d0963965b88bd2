use ucommon::BoxFuture;

use crate::{
    CapabilityDescriptor, ChatRequest, ChatResponse, EventStream, ProviderError, ProviderId,
};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

/// One vendor behind the uniform chat contract.
///
/// Adapters receive requests that have already passed the capability gate, so they never
/// re-check descriptor flags. Errors they return carry their provider id.
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> ProviderId;

    fn capabilities(&self) -> &CapabilityDescriptor;

    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>>;

    /// Returns a lazy event stream; nothing is sent until the first poll.
    fn stream<'a>(&'a self, request: ChatRequest) -> EventStream<'a> {
        let _ = request;
        EventStream::from_error(
            ProviderError::unsupported("streaming is not implemented").with_provider(self.id()),
        )
    }
}
