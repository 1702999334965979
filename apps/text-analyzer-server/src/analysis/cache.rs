//! Time-bounded in-memory cache
//!
//! Entries expire a fixed time after insertion. Expired entries are dropped
//! when read, and the whole map is swept at most once per check period,
//! piggybacking on regular cache traffic rather than a background task.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::CacheConfig;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    last_sweep: Instant,
}

/// Cache with a fixed time-to-live per entry
pub struct TtlCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    ttl: Duration,
    check_period: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            ttl: config.ttl,
            check_period: config.check_period,
        }
    }

    /// Live value for `key`
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        self.maybe_sweep(&mut inner, now);

        let expired = match inner.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            inner.entries.remove(key);
        }
        None
    }

    /// Insert or replace `key`, restarting its lifetime
    pub fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        self.maybe_sweep(&mut inner, now);

        inner.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop `key`, returning whether it was present
    pub fn invalidate(&self, key: &K) -> bool {
        self.inner.lock().entries.remove(key).is_some()
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn maybe_sweep(&self, inner: &mut Inner<K, V>, now: Instant) {
        if now.duration_since(inner.last_sweep) < self.check_period {
            return;
        }

        let before = inner.entries.len();
        inner.entries.retain(|_, entry| entry.expires_at > now);
        inner.last_sweep = now;

        let swept = before - inner.entries.len();
        if swept > 0 {
            tracing::debug!(swept, "Swept expired cache entries");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ttl_ms: u64, check_ms: u64) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_millis(ttl_ms),
            check_period: Duration::from_millis(check_ms),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = TtlCache::new(config(60_000, 1_000));
        assert!(cache.is_empty());

        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_replaces() {
        let cache = TtlCache::new(config(60_000, 1_000));
        cache.insert("a", 1);
        cache.insert("a", 2);

        assert_eq!(cache.get(&"a"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entries_expire() {
        let cache = TtlCache::new(config(20, 60_000));
        cache.insert("a", 1);

        std::thread::sleep(Duration::from_millis(40));

        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_drops_untouched_expired_entries() {
        let cache = TtlCache::new(config(10, 20));
        cache.insert("stale", 1);

        std::thread::sleep(Duration::from_millis(40));

        // Reading another key triggers the periodic sweep
        assert_eq!(cache.get(&"other"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_no_sweep_before_check_period() {
        let cache = TtlCache::new(config(10, 60_000));
        cache.insert("stale", 1);

        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.get(&"other"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate() {
        let cache = TtlCache::new(config(60_000, 1_000));
        cache.insert("a", 1);

        assert!(cache.invalidate(&"a"));
        assert!(!cache.invalidate(&"a"));
        assert_eq!(cache.get(&"a"), None);
    }
}
