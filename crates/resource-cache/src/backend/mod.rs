//! Persistence backends.

mod counting;
mod file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::entry::CacheEntry;
use crate::error::CacheResult;
use crate::key::CacheKey;

pub use counting::{BackendStats, CountingBackend};
pub use file::FileBackend;
pub use memory::InMemoryBackend;

/// Keyed storage for cache entries.
///
/// Implementations must make `put` atomic per key: a concurrent reader sees
/// either the previous entry or the new one, never a mix of both.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Load the entry stored under `key`.
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheEntry>>;

    /// Store `entry` under `key`, replacing any previous entry.
    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> CacheResult<()>;

    /// Delete the entry stored under `key`. Deleting a missing key is not an
    /// error.
    async fn remove(&self, key: &CacheKey) -> CacheResult<()>;

    /// Delete every entry.
    async fn clear(&self) -> CacheResult<()>;

    /// List stored keys.
    async fn keys(&self) -> CacheResult<Vec<CacheKey>>;
}

#[async_trait]
impl<B: PersistenceBackend + ?Sized> PersistenceBackend for Arc<B> {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheEntry>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> CacheResult<()> {
        (**self).put(key, entry).await
    }

    async fn remove(&self, key: &CacheKey) -> CacheResult<()> {
        (**self).remove(key).await
    }

    async fn clear(&self) -> CacheResult<()> {
        (**self).clear().await
    }

    async fn keys(&self) -> CacheResult<Vec<CacheKey>> {
        (**self).keys().await
    }
}
