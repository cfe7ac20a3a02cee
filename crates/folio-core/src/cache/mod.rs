//! Caches for small derived read models
//!
//! Entries are computed on read and cleared by the handler that mutated the
//! underlying rows, after commit. Writers do not coordinate: the last writer
//! wins. A lock poisoned by a panicking thread stops reads and writes but not
//! clears, so a stale entry can never outlive its invalidation.

pub mod custom_entity_cache;
pub mod image_asset_cache;
pub mod page_cache;

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

pub use custom_entity_cache::CustomEntityCache;
pub use image_asset_cache::ImageAssetCache;
pub use page_cache::PageCache;

/// Point-in-time counters for one cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Bounded LRU map; a capacity of zero disables caching entirely
pub struct ObjectCache<K: Hash + Eq, V: Clone> {
    entries: Option<Mutex<LruCache<K, V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> ObjectCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// Lock for reads and writes; a poisoned lock behaves as a miss
    fn lock(&self) -> Option<MutexGuard<'_, LruCache<K, V>>> {
        match self.entries.as_ref()?.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::warn!("cache lock poisoned; bypassing cache");
                None
            }
        }
    }

    /// Lock for invalidation, recovering a poisoned lock
    fn lock_for_clear(&self) -> Option<MutexGuard<'_, LruCache<K, V>>> {
        Some(self.entries.as_ref()?.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("cache lock poisoned; clearing through it");
            poisoned.into_inner()
        }))
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let found = self.lock().and_then(|mut cache| cache.get(key).cloned());
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    pub fn set(&self, key: K, value: V) {
        if let Some(mut cache) = self.lock() {
            cache.put(key, value);
        }
    }

    /// Return the cached value or compute, store and return it
    ///
    /// The lock is not held while `compute` runs, so it may itself read
    /// through other caches.
    pub fn get_or_add<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.set(key, value.clone());
        Ok(value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock()
            .map(|cache| cache.contains(key))
            .unwrap_or(false)
    }

    pub fn clear(&self, key: &K) {
        if let Some(mut cache) = self.lock_for_clear() {
            cache.pop(key);
        }
    }

    pub fn clear_all(&self) {
        if let Some(mut cache) = self.lock_for_clear() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.lock()
            .map(|cache| cache.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let capacity = self
            .lock()
            .map(|cache| cache.cap().get())
            .unwrap_or(0);
        CacheStats {
            size: self.len(),
            capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_add_computes_once() {
        let cache: ObjectCache<i64, String> = ObjectCache::new(4);
        let mut calls = 0;
        for _ in 0..3 {
            let value: Result<String, ()> = cache.get_or_add(1, || {
                calls += 1;
                Ok("one".to_string())
            });
            assert_eq!(value.unwrap(), "one");
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.stats().hits, 2);
    }

    #[test]
    fn test_failed_compute_is_not_cached() {
        let cache: ObjectCache<i64, String> = ObjectCache::new(4);
        let result: Result<String, &str> = cache.get_or_add(1, || Err("db down"));
        assert!(result.is_err());
        assert!(!cache.contains(&1));
    }

    #[test]
    fn test_zero_capacity_is_pass_through() {
        let cache: ObjectCache<i64, i64> = ObjectCache::new(0);
        cache.set(1, 10);
        assert!(!cache.is_enabled());
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_lands_on_poisoned_lock() {
        let cache: ObjectCache<i64, i64> = ObjectCache::new(4);
        cache.set(1, 1);
        cache.set(2, 2);
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = cache.entries.as_ref().unwrap().lock().unwrap();
            panic!("handler panicked while holding the cache lock");
        }));
        assert!(poisoned.is_err());

        assert_eq!(cache.get(&1), None);
        cache.clear(&1);

        let entries = cache
            .entries
            .as_ref()
            .unwrap()
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        assert!(!entries.contains(&1));
        assert!(entries.contains(&2));
    }

    #[test]
    fn test_lru_eviction_and_clear() {
        let cache: ObjectCache<i64, i64> = ObjectCache::new(2);
        cache.set(1, 1);
        cache.set(2, 2);
        cache.set(3, 3);
        assert!(!cache.contains(&1));

        cache.clear(&2);
        assert!(!cache.contains(&2));
        cache.clear_all();
        assert_eq!(cache.len(), 0);
    }
}
