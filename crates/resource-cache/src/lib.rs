//! Response cache for remote resources.
//!
//! This crate provides:
//! - `CacheKey` - Stable key derived from a `Locator`
//! - `CacheEntry` - Stored response bytes plus validator and expiry metadata
//! - `CachePolicy` - Per-resource freshness and revalidation rules
//! - `Cache` - Get/put/invalidate over a `PersistenceBackend`
//! - `InMemoryBackend` / `FileBackend` / `CountingBackend` - Storage backends
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use resource_cache::{Cache, CacheKey, CachePolicy, InMemoryBackend};
//! use resource_core::Locator;
//!
//! let cache = Cache::new(InMemoryBackend::new());
//! let policy = CachePolicy::max_age(Duration::from_secs(300));
//!
//! let key = CacheKey::from_locator(&Locator::app_configuration());
//! let decision = policy.is_valid(cache.get(&key).await?.as_ref(), chrono::Utc::now());
//! ```

mod backend;
mod entry;
mod error;
mod key;
mod policy;
mod store;

pub use backend::*;
pub use entry::*;
pub use error::*;
pub use key::*;
pub use policy::*;
pub use store::*;
