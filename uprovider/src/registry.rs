//! Adapter registry keyed by provider id.
//!
//! ```rust
//! use uprovider::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! assert!(registry.is_empty());
//! assert_eq!(registry.len(), 0);
//! assert!(registry.describe(&"openai".into()).is_err());
//! ```

use std::sync::Arc;

use ucommon::Registry;

use crate::{CapabilityDescriptor, LlmError, ProviderAdapter, ProviderId};

#[derive(Default)]
pub struct ProviderRegistry {
    adapters: Registry<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `adapter` under its own id.
    pub fn register<A>(&mut self, adapter: A) -> Result<(), LlmError>
    where
        A: ProviderAdapter + 'static,
    {
        let id = adapter.id();
        self.register_shared(id, Arc::new(adapter))
    }

    /// Registers an adapter under an explicit id. Ids are unique for the registry's lifetime.
    pub fn register_shared(
        &mut self,
        id: ProviderId,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Result<(), LlmError> {
        self.adapters.try_insert(id, adapter).map_err(|(id, _)| {
            LlmError::configuration(format!("provider '{id}' is already registered"))
        })
    }

    pub fn get(&self, id: &ProviderId) -> Option<&dyn ProviderAdapter> {
        self.adapters.get(id).map(|adapter| adapter.as_ref())
    }

    pub fn describe(&self, id: &ProviderId) -> Result<&CapabilityDescriptor, LlmError> {
        self.adapters
            .get(id)
            .map(|adapter| adapter.capabilities())
            .ok_or_else(|| LlmError::UnsupportedProvider(id.clone()))
    }

    pub fn contains(&self, id: &ProviderId) -> bool {
        self.adapters.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<ProviderId> {
        let mut ids = self.adapters.keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}
