#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-process result cache with per-entry expiry.
//!
//! Entries carry an expiry instant that is checked on every read. Expired
//! entries are dropped when read, and every [`ResultCache::put`] sweeps the
//! rest, so the map never outgrows the set of live keys plus one write.
//!
//! The map is lock-guarded, but the usual check, fetch, store sequence is
//! not atomic: two requests that miss on the same key concurrently will both
//! fetch, and the last [`ResultCache::put`] wins.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct CacheEntry<T> {
    value: T,
    /// `None` when `ttl` overflows the clock; such entries never expire.
    expires_at: Option<Instant>,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// A string-keyed cache of cloneable values.
#[derive(Debug)]
pub struct ResultCache<T> {
    entries: RwLock<BTreeMap<String, CacheEntry<T>>>,
}

impl<T> Default for ResultCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultCache<T> {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    /// Expired entries are swept first.
    ///
    /// Always returns `true`; the return value mirrors stores that can
    /// refuse writes.
    pub fn put(&self, key: impl Into<String>, value: T, ttl: Duration) -> bool {
        let key = key.into();
        let now = Instant::now();
        let expires_at = now.checked_add(ttl);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let swept = sweep(&mut entries, now);
        if swept > 0 {
            log::debug!("Cache swept {swept} expired entries");
        }

        log::debug!("Cache set: {key} (TTL: {}s)", ttl.as_secs());
        entries.insert(key, CacheEntry { value, expires_at });
        true
    }

    /// Removes entries whose key contains `pattern` (`"*"` removes
    /// everything). Returns the number of entries removed.
    pub fn clear(&self, pattern: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();

        if pattern == "*" {
            entries.clear();
        } else {
            entries.retain(|key, _| !key.contains(pattern));
        }

        let removed = before - entries.len();
        log::info!("Cache cleared: {pattern} ({removed} entries)");
        removed
    }

    /// Number of stored entries, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sweep<T>(entries: &mut BTreeMap<String, CacheEntry<T>>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before - entries.len()
}

impl<T: Clone> ResultCache<T> {
    /// Returns a clone of the live value under `key`.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = Instant::now();

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => {
                    log::debug!("Cache hit: {key}");
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            log::debug!("Cache expired: {key}");
            entries.remove(key);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_stored_value_before_expiry() {
        let cache = ResultCache::new();
        assert!(cache.put("a", 1, DEFAULT_TTL));
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn expired_entries_are_absent_and_dropped() {
        let cache = ResultCache::new();
        cache.put("stale", "x".to_string(), Duration::ZERO);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("stale"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn put_replaces_previous_value() {
        let cache = ResultCache::new();
        cache.put("k", 1, DEFAULT_TTL);
        cache.put("k", 2, DEFAULT_TTL);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sweep_keeps_live_entries() {
        let cache = ResultCache::new();
        cache.put("live", 1, DEFAULT_TTL);
        cache.put("dead", 2, Duration::ZERO);
        cache.put("next", 3, DEFAULT_TTL);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("live"), Some(1));
        assert_eq!(cache.get("next"), Some(3));
    }

    #[test]
    fn writes_sweep_expired_keys() {
        let cache = ResultCache::new();
        for i in 0..1000 {
            cache.put(format!("satellite_data:{i}"), i, Duration::ZERO);
        }
        assert_eq!(cache.len(), 1);

        cache.put("live", -1, DEFAULT_TTL);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("live"), Some(-1));
    }

    #[test]
    fn clear_by_pattern_and_wildcard() {
        let cache = ResultCache::new();
        cache.put("satellite_data_a", 1, DEFAULT_TTL);
        cache.put("satellite_data_b", 2, DEFAULT_TTL);
        cache.put("other", 3, DEFAULT_TTL);

        assert_eq!(cache.clear("satellite"), 2);
        assert_eq!(cache.get("other"), Some(3));
        assert_eq!(cache.clear("*"), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn huge_ttl_never_expires() {
        let cache = ResultCache::new();
        cache.put("k", 1, Duration::MAX);
        cache.put("other", 2, DEFAULT_TTL);
        assert_eq!(cache.get("k"), Some(1));
        assert_eq!(cache.len(), 2);
    }
}
