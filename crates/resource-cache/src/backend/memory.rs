//! In-memory backend.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::PersistenceBackend;
use crate::entry::CacheEntry;
use crate::error::{CacheError, CacheResult};
use crate::key::CacheKey;

/// Process-local backend. All keys share one lock, so every `put` is atomic.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> CacheError {
    CacheError::Storage("in-memory cache lock poisoned".to_string())
}

#[async_trait]
impl PersistenceBackend for InMemoryBackend {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheEntry>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> CacheResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> CacheResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.clear();
        Ok(())
    }

    async fn keys(&self) -> CacheResult<Vec<CacheKey>> {
        let entries = self.entries.read().map_err(poisoned)?;
        let mut keys: Vec<CacheKey> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
