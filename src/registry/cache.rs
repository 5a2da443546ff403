// src/registry/cache.rs
use async_trait::async_trait;
use log::{debug, info};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::RegistryProvider;
use crate::error::ReconcileError;
use crate::matching::normalize::normalize_country;
use crate::models::{EntityType, RegistryTable};

const DEFAULT_CACHE_SIZE: usize = 32;

type CacheKey = (EntityType, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// Memoizes registry fetches per (entity type, normalized country). Owned by
/// the caller; to the engine it is just another provider.
pub struct RegistryCache<P> {
    inner: P,
    cache: Arc<Mutex<LruCache<CacheKey, Arc<RegistryTable>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<P: RegistryProvider> RegistryCache<P> {
    pub fn new(inner: P, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN));
        info!("Initializing RegistryCache with capacity: {}", capacity);
        Self {
            inner,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Drops the cached table for one pair so the next fetch goes upstream.
    pub async fn invalidate(&self, entity_type: EntityType, country: &str) -> bool {
        let key = (entity_type, normalize_country(country));
        self.cache.lock().await.pop(&key).is_some()
    }

    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.lock().await.len(),
        }
    }
}

#[async_trait]
impl<P: RegistryProvider> RegistryProvider for RegistryCache<P> {
    async fn fetch(
        &self,
        entity_type: EntityType,
        country: &str,
    ) -> Result<Arc<RegistryTable>, ReconcileError> {
        let key = (entity_type, normalize_country(country));

        if let Some(table) = self.cache.lock().await.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Registry cache hit for {} / {}", entity_type, key.1);
            return Ok(Arc::clone(table));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        // lock is not held across the upstream fetch; failures are not cached
        let table = self.inner.fetch(entity_type, country).await?;
        self.cache.lock().await.put(key, Arc::clone(&table));
        Ok(table)
    }
}
