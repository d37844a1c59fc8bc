//! In-memory time-to-live cache
//!
//! Entries older than the configured TTL are treated as absent. Expired
//! entries are dropped lazily on lookup or through [`TtlCache::purge_expired`];
//! the map is otherwise unbounded.
//!
//! Timestamps come from `tokio::time::Instant`, so tests running on a paused
//! tokio clock can move entries past their TTL with `tokio::time::advance`.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use workorder_core::cache::TtlCache;
//!
//! let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
//! cache.insert("answer".to_string(), 42);
//! assert_eq!(cache.get("answer"), Some(42));
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::Instant;

/// A cached value and the moment it was stored
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of stored entries, fresh or not
    pub entries: usize,
    /// Number of entries past their TTL
    pub expired: usize,
}

/// Thread-safe map whose entries expire after a fixed TTL
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Configured TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }

    /// Get a fresh value, or `None` if missing or expired
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let guard = self.entries.read().unwrap_or_else(|e| e.into_inner());
        guard
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone())
    }

    /// Whether a fresh entry exists for `key`
    pub fn contains_fresh<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let guard = self.entries.read().unwrap_or_else(|e| e.into_inner());
        guard.get(key).is_some_and(|entry| self.is_fresh(entry, now))
    }

    /// Store a value, replacing any previous entry and resetting its age
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(key, entry);
    }

    /// Remove one entry, returning whether it existed
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        guard.remove(key).is_some()
    }

    /// Remove every entry
    pub fn clear(&self) {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        guard.clear();
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = guard.len();
        guard.retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < self.ttl);
        before - guard.len()
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let guard = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let expired = guard
            .values()
            .filter(|entry| !self.is_fresh(entry, now))
            .count();
        CacheStats {
            entries: guard.len(),
            expired,
        }
    }
}
