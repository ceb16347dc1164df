//! Per-resource cache policies.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::entry::CacheEntry;

/// How long a stored response may be served without asking the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Never fresh; every fetch goes to the network (conditionally, if the
    /// policy revalidates).
    None,
    /// Fresh for a fixed time after storing.
    MaxAge(Duration),
    /// Fresh until the end of the UTC day the entry was stored on.
    SameDay,
}

/// Outcome of a cache validity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    /// Serve the stored bytes without a network call.
    UseCached,
    /// Ask the server whether the entry with this validator tag changed.
    MustRevalidate(String),
    /// Fetch unconditionally.
    MustFetch,
}

impl fmt::Display for CacheDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseCached => write!(f, "use-cached"),
            Self::MustRevalidate(_) => write!(f, "must-revalidate"),
            Self::MustFetch => write!(f, "must-fetch"),
        }
    }
}

/// Cache policy of one resource.
///
/// There is no global default: a resource is cached only when it carries an
/// explicit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Freshness rule.
    pub freshness: Freshness,
    /// Send the stored validator tag once the entry is no longer fresh.
    pub revalidate: bool,
}

impl CachePolicy {
    /// Fresh for `max_age`, revalidated afterwards.
    pub fn max_age(max_age: Duration) -> Self {
        Self {
            freshness: Freshness::MaxAge(max_age),
            revalidate: true,
        }
    }

    /// Fresh until the end of the UTC day, revalidated afterwards.
    pub fn once_a_day() -> Self {
        Self {
            freshness: Freshness::SameDay,
            revalidate: true,
        }
    }

    /// Always revalidate with the server.
    pub fn always_revalidate() -> Self {
        Self {
            freshness: Freshness::None,
            revalidate: true,
        }
    }

    /// Fetch unconditionally once the entry is stale.
    pub fn without_revalidation(mut self) -> Self {
        self.revalidate = false;
        self
    }

    /// Expiry of an entry stored (or revalidated) at `stored_at`.
    pub fn expiry_for(&self, stored_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.freshness {
            Freshness::None => None,
            Freshness::MaxAge(max_age) => chrono::Duration::from_std(max_age)
                .ok()
                .and_then(|max_age| stored_at.checked_add_signed(max_age)),
            Freshness::SameDay => stored_at
                .date_naive()
                .succ_opt()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|midnight| midnight.and_utc()),
        }
    }

    /// Decide whether `entry` may be served at `now`.
    ///
    /// An entry is fresh only while both its own declared expiry and the
    /// expiry this policy assigns to its timestamp lie ahead, and never when
    /// it claims to be stored in the future.
    pub fn is_valid(&self, entry: Option<&CacheEntry>, now: DateTime<Utc>) -> CacheDecision {
        let Some(entry) = entry else {
            return CacheDecision::MustFetch;
        };

        if self.is_fresh(entry, now) {
            return CacheDecision::UseCached;
        }

        match (&entry.validator_tag, self.revalidate) {
            (Some(tag), true) => CacheDecision::MustRevalidate(tag.clone()),
            _ => CacheDecision::MustFetch,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        if now < entry.stored_at || entry.is_expired(now) {
            return false;
        }

        self.expiry_for(entry.stored_at)
            .is_some_and(|expires_at| now < expires_at)
    }
}
