// src/registry/memory.rs
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::RegistryProvider;
use crate::error::ReconcileError;
use crate::models::{CanonicalEntity, EntityType, RegistryTable};

/// Registry held in memory, used for fixtures and tests. Counts fetches so
/// callers can check memoization.
#[derive(Default)]
pub struct InMemoryRegistry {
    entities: HashMap<EntityType, Vec<CanonicalEntity>>,
    fetches: AtomicUsize,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(mut self, entity_type: EntityType, entities: Vec<CanonicalEntity>) -> Self {
        self.entities.entry(entity_type).or_default().extend(entities);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryProvider for InMemoryRegistry {
    async fn fetch(
        &self,
        entity_type: EntityType,
        country: &str,
    ) -> Result<Arc<RegistryTable>, ReconcileError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let entities = self.entities.get(&entity_type).cloned().unwrap_or_default();
        Ok(Arc::new(RegistryTable::from_entities(entity_type, country, entities)))
    }
}
