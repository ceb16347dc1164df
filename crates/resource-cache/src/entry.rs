//! Cached response entries.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::key::CacheKey;

/// A stored response for one cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Key this entry is stored under.
    pub key: CacheKey,
    /// Raw response body, exactly as received.
    pub data: Bytes,
    /// When the response was stored or last revalidated.
    pub stored_at: DateTime<Utc>,
    /// Validator tag (ETag) for conditional requests.
    pub validator_tag: Option<String>,
    /// Declared expiry; `None` means the entry is never fresh on its own.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Create a new entry stored at `stored_at`.
    pub fn new(key: CacheKey, data: impl Into<Bytes>, stored_at: DateTime<Utc>) -> Self {
        Self {
            key,
            data: data.into(),
            stored_at,
            validator_tag: None,
            expires_at: None,
        }
    }

    /// Set the validator tag.
    pub fn with_validator_tag(mut self, tag: Option<String>) -> Self {
        self.validator_tag = tag;
        self
    }

    /// Set the expiry.
    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Copy of this entry after a "not modified" answer: same bytes, new
    /// timestamp and expiry. A tag sent along with the answer replaces the
    /// stored one.
    pub fn refreshed(
        &self,
        now: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        validator_tag: Option<String>,
    ) -> Self {
        Self {
            key: self.key.clone(),
            data: self.data.clone(),
            stored_at: now,
            validator_tag: validator_tag.or_else(|| self.validator_tag.clone()),
            expires_at,
        }
    }

    /// Size of the stored body in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Age of the entry at `now`; zero if stored in the future.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.stored_at).max(chrono::Duration::zero())
    }

    /// Check whether the declared expiry has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_refreshed_keeps_bytes() {
        let entry = CacheEntry::new(CacheKey::new("k"), &b"payload"[..], at(8))
            .with_validator_tag(Some("\"v1\"".to_string()))
            .with_expiry(Some(at(9)));

        let refreshed = entry.refreshed(at(10), Some(at(11)), None);
        assert_eq!(refreshed.data, entry.data);
        assert_eq!(refreshed.stored_at, at(10));
        assert_eq!(refreshed.expires_at, Some(at(11)));
        assert_eq!(refreshed.validator_tag.as_deref(), Some("\"v1\""));
    }

    #[test]
    fn test_refreshed_takes_new_tag() {
        let entry = CacheEntry::new(CacheKey::new("k"), &b"payload"[..], at(8))
            .with_validator_tag(Some("\"v1\"".to_string()));
        let refreshed = entry.refreshed(at(10), None, Some("\"v2\"".to_string()));
        assert_eq!(refreshed.validator_tag.as_deref(), Some("\"v2\""));
    }

    #[test]
    fn test_expiry() {
        let entry = CacheEntry::new(CacheKey::new("k"), Bytes::new(), at(8)).with_expiry(Some(at(9)));
        assert!(!entry.is_expired(at(8)));
        assert!(entry.is_expired(at(9)));

        let no_expiry = CacheEntry::new(CacheKey::new("k"), Bytes::new(), at(8));
        assert!(no_expiry.is_expired(at(8)));
    }

    #[test]
    fn test_age_never_negative() {
        let entry = CacheEntry::new(CacheKey::new("k"), Bytes::new(), at(10));
        assert_eq!(entry.age(at(8)), chrono::Duration::zero());
        assert_eq!(entry.age(at(12)), chrono::Duration::hours(2));
    }
}
