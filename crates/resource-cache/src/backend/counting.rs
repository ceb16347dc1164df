//! Call-counting backend wrapper.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Serialize;

use super::PersistenceBackend;
use crate::entry::CacheEntry;
use crate::error::CacheResult;
use crate::key::CacheKey;

/// Snapshot of backend call counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendStats {
    pub gets: u64,
    pub hits: u64,
    pub puts: u64,
    pub removes: u64,
}

/// Wraps a backend and counts calls into it.
#[derive(Debug, Default)]
pub struct CountingBackend<B> {
    inner: B,
    gets: AtomicU64,
    hits: AtomicU64,
    puts: AtomicU64,
    removes: AtomicU64,
}

impl<B> CountingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            gets: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            puts: AtomicU64::new(0),
            removes: AtomicU64::new(0),
        }
    }

    /// Wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Current counts.
    pub fn stats(&self) -> BackendStats {
        BackendStats {
            gets: self.gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl<B: PersistenceBackend> PersistenceBackend for CountingBackend<B> {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheEntry>> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        let entry = self.inner.get(key).await?;
        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(entry)
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> CacheResult<()> {
        self.puts.fetch_add(1, Ordering::Relaxed);
        self.inner.put(key, entry).await
    }

    async fn remove(&self, key: &CacheKey) -> CacheResult<()> {
        self.removes.fetch_add(1, Ordering::Relaxed);
        self.inner.remove(key).await
    }

    async fn clear(&self) -> CacheResult<()> {
        self.inner.clear().await
    }

    async fn keys(&self) -> CacheResult<Vec<CacheKey>> {
        self.inner.keys().await
    }
}
