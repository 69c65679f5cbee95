use crate::Provider;
use arena_types::ProviderId;
use std::collections::HashMap;
use std::sync::Arc;

/// Binds `ProviderId`s to live `Provider` implementations. The Scheduler and
/// Conversation Runner look providers up by ID rather than holding concrete
/// types, since the bound set is only known once configuration is loaded.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ProviderId, provider: Arc<dyn Provider>) -> &mut Self {
        self.providers.insert(id, provider);
        self
    }

    pub fn get(&self, id: &ProviderId) -> Option<Arc<dyn Provider>> {
        self.providers.get(id).cloned()
    }

    pub fn contains(&self, id: &ProviderId) -> bool {
        self.providers.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ProviderId> {
        self.providers.keys()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
