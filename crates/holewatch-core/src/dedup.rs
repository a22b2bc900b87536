// ── Report deduplication ──
//
// Each cache maps a system code to the time it was first reported in the
// current window. Eviction and lookup are separate steps; the check
// cycle always evicts before it evaluates new matches.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Time-bounded set of already-reported keys.
#[derive(Debug, Clone)]
pub struct DedupCache {
    ttl: TimeDelta,
    first_seen: HashMap<String, DateTime<Utc>>,
}

impl DedupCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            first_seen: HashMap::new(),
        }
    }

    /// Drop every entry older than the TTL. Returns how many were removed.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.first_seen.len();
        let ttl = self.ttl;
        self.first_seen.retain(|_, seen| now - *seen <= ttl);
        before - self.first_seen.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.first_seen.contains_key(key)
    }

    /// Record `key` as reported at `now`. Returns `false` if it was
    /// already present, leaving the original timestamp untouched.
    pub fn record(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        if self.first_seen.contains_key(key) {
            return false;
        }
        self.first_seen.insert(key.to_owned(), now);
        true
    }

    pub fn first_seen(&self, key: &str) -> Option<DateTime<Utc>> {
        self.first_seen.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}

/// The three independent caches owned by the check cycle.
#[derive(Debug, Clone)]
pub struct DedupCaches {
    pub connections: DedupCache,
    pub groups: DedupCache,
    pub patterns: DedupCache,
}

impl DedupCaches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            connections: DedupCache::new(ttl),
            groups: DedupCache::new(ttl),
            patterns: DedupCache::new(ttl),
        }
    }

    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        self.connections.evict_expired(now)
            + self.groups.evict_expired(now)
            + self.patterns.evict_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap_or_default()
    }

    #[test]
    fn record_fires_once_per_window() {
        let mut cache = DedupCache::new(Duration::from_secs(3600));
        assert!(cache.record("J000123", at(0)));
        assert!(!cache.record("J000123", at(10)));
        assert_eq!(cache.first_seen("J000123"), Some(at(0)));
    }

    #[test]
    fn eviction_removes_only_entries_past_ttl() {
        let mut cache = DedupCache::new(Duration::from_secs(3600));
        cache.record("OLD", at(0));
        cache.record("NEW", at(3000));

        assert_eq!(cache.evict_expired(at(3600)), 0);
        assert_eq!(cache.evict_expired(at(3601)), 1);
        assert!(!cache.contains("OLD"));
        assert!(cache.contains("NEW"));
    }

    #[test]
    fn eviction_is_idempotent() {
        let mut cache = DedupCache::new(Duration::from_secs(60));
        cache.record("A", at(0));
        cache.record("B", at(50));
        cache.evict_expired(at(100));
        let once: Vec<_> = {
            let mut keys: Vec<_> = ["A", "B"].iter().filter(|k| cache.contains(k)).collect();
            keys.sort();
            keys
        };
        assert_eq!(cache.evict_expired(at(100)), 0);
        let twice: Vec<_> = ["A", "B"].iter().filter(|k| cache.contains(k)).collect();
        assert_eq!(once, twice);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicted_key_can_be_recorded_again() {
        let mut cache = DedupCache::new(Duration::from_secs(60));
        cache.record("A", at(0));
        cache.evict_expired(at(61));
        assert!(cache.record("A", at(61)));
    }

    #[test]
    fn caches_are_independent() {
        let mut caches = DedupCaches::new(Duration::from_secs(60));
        caches.groups.record("A", at(0));
        assert!(!caches.patterns.contains("A"));
        assert!(!caches.connections.contains("A"));
        assert_eq!(caches.evict_expired(at(120)), 1);
        assert!(caches.groups.is_empty());
    }
}
