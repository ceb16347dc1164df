//! Cache key derivation.

use std::fmt;

use resource_core::Locator;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A cache key uniquely identifying one stored response.
///
/// Keys derived from locators are the hex SHA-256 digest of a canonical
/// description of the request, so they are stable across processes and
/// safe to use as file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Create a cache key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive the key for a locator.
    pub fn from_locator(locator: &Locator) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical_request(locator));
        Self(hex::encode(hasher.finalize()))
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Locator> for CacheKey {
    fn from(locator: &Locator) -> Self {
        Self::from_locator(locator)
    }
}

/// One line per request component. Header names are case-insensitive on the
/// wire, so they are lowercased before hashing.
fn canonical_request(locator: &Locator) -> String {
    let mut parts = vec![
        locator.endpoint().to_string(),
        locator.method().to_string(),
        locator.path(),
    ];

    for (name, value) in locator.headers() {
        parts.push(format!("h:{}={}", name.to_ascii_lowercase(), value));
    }

    for (name, value) in locator.query() {
        parts.push(format!("q:{}={}", name, value));
    }

    parts.join("\n")
}
