//! Registry of provider adapters keyed by [`ProviderId`].

use std::sync::Arc;

use dashmap::DashMap;

use inline_protocols::{ProviderAdapter, ProviderId};

use crate::error::DispatchError;

/// Closed set of adapters the dispatcher can route to.
pub struct ProviderSet {
    adapters: DashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl ProviderSet {
    /// Create an empty provider set.
    pub fn new() -> Self {
        Self {
            adapters: DashMap::new(),
        }
    }

    /// Register an adapter under its own id.
    pub fn register(&self, adapter: Arc<dyn ProviderAdapter>) -> Result<(), DispatchError> {
        let id = adapter.id();

        if self.adapters.contains_key(&id) {
            return Err(DispatchError::AlreadyRegistered(id));
        }

        self.adapters.insert(id, adapter);
        Ok(())
    }

    /// Register several adapters, stopping at the first duplicate.
    pub fn register_all<I>(&self, adapters: I) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = Arc<dyn ProviderAdapter>>,
    {
        for adapter in adapters {
            self.register(adapter)?;
        }
        Ok(())
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&id).map(|a| a.clone())
    }

    /// Resolve a wire provider string to an adapter.
    pub fn resolve(&self, provider: &str) -> Result<Arc<dyn ProviderAdapter>, DispatchError> {
        provider
            .parse::<ProviderId>()
            .ok()
            .and_then(|id| self.get(id))
            .ok_or_else(|| DispatchError::UnknownProvider(provider.to_string()))
    }

    /// Registered ids in catalogue order.
    pub fn ids(&self) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = self.adapters.iter().map(|e| *e.key()).collect();
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

impl Default for ProviderSet {
    fn default() -> Self {
        Self::new()
    }
}
