//! Keyed response cache.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::entry::CacheEntry;
use crate::error::CacheResult;
use crate::key::CacheKey;

/// Response cache over a persistence backend.
///
/// Holds at most one entry per key; `put` overwrites. There is no eviction
/// beyond that; size limits belong to the backend.
#[derive(Debug)]
pub struct Cache<B> {
    backend: B,
}

impl<B: PersistenceBackend> Cache<B> {
    /// Create a cache over `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the entry for `key`.
    pub async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheEntry>> {
        self.backend.get(key).await
    }

    /// Store `entry` under `key`, replacing any previous entry.
    pub async fn put(&self, key: &CacheKey, mut entry: CacheEntry) -> CacheResult<()> {
        entry.key = key.clone();
        self.backend.put(key, entry).await
    }

    /// Drop the entry for `key`.
    pub async fn invalidate(&self, key: &CacheKey) -> CacheResult<()> {
        debug!(key = %key, "Invalidating cache entry");
        self.backend.remove(key).await
    }

    /// Record a successful revalidation of `entry`: bytes stay, timestamp,
    /// expiry and (if given) validator tag are replaced.
    pub async fn touch(
        &self,
        entry: &CacheEntry,
        now: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        validator_tag: Option<String>,
    ) -> CacheResult<CacheEntry> {
        let refreshed = entry.refreshed(now, expires_at, validator_tag);
        self.backend.put(&entry.key, refreshed.clone()).await?;
        Ok(refreshed)
    }

    /// Drop every entry.
    pub async fn clear(&self) -> CacheResult<()> {
        self.backend.clear().await
    }

    /// List stored keys.
    pub async fn keys(&self) -> CacheResult<Vec<CacheKey>> {
        self.backend.keys().await
    }
}
