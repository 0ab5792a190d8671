// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-process TTL cache

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::key_value::{CacheResult, KeyValueCache};

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| now >= at)
    }
}

/// Writes between two sweeps of the whole map
const PURGE_INTERVAL: usize = 256;

/// [`KeyValueCache`] held in a map behind a read-write lock.
///
/// Expired entries are invisible to reads. They are dropped when read, when a
/// scan passes over them, and by a sweep every [`PURGE_INTERVAL`] writes.
#[derive(Debug, Default)]
pub struct MemoryKeyValueCache {
    entries: RwLock<HashMap<String, Entry>>,
    writes: AtomicUsize,
}

impl MemoryKeyValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until purged
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

impl KeyValueCache for MemoryKeyValueCache {
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: re-check under the write lock, a fresh set may have landed
        let mut entries = self.entries.write();
        if entries.get(key).map_or(false, |entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        let entry = Entry {
            value: value.to_vec(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().insert(key.to_string(), entry);

        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % PURGE_INTERVAL == 0 {
            let purged = self.purge_expired();
            if purged > 0 {
                log::trace!("Swept {} expired cache entries", purged);
            }
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        entries.retain(|key, entry| !(key.starts_with(prefix) && entry.is_expired(now)));

        let mut keys: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_set_get_delete() {
        let cache = MemoryKeyValueCache::new();
        cache.set("adset:node:1", b"one", None).unwrap();
        assert_eq!(cache.get("adset:node:1").unwrap(), Some(b"one".to_vec()));

        cache.delete("adset:node:1").unwrap();
        assert_eq!(cache.get("adset:node:1").unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_invisible() {
        let cache = MemoryKeyValueCache::new();
        cache
            .set("short", b"x", Some(Duration::from_millis(10)))
            .unwrap();
        cache.set("long", b"y", Some(Duration::from_secs(60))).unwrap();

        thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.get("short").unwrap(), None);
        assert_eq!(cache.get("long").unwrap(), Some(b"y".to_vec()));
        assert_eq!(cache.scan_prefix("").unwrap(), vec!["long".to_string()]);
    }

    #[test]
    fn test_purge_expired() {
        let cache = MemoryKeyValueCache::new();
        cache.set("a", b"1", Some(Duration::from_millis(1))).unwrap();
        cache.set("b", b"2", None).unwrap();
        thread::sleep(Duration::from_millis(10));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_scan_drops_expired_entries_under_prefix() {
        let cache = MemoryKeyValueCache::new();
        cache
            .set("adset:result:a", b"[]", Some(Duration::from_millis(1)))
            .unwrap();
        cache
            .set("adset:node:a", b"{}", Some(Duration::from_millis(1)))
            .unwrap();
        thread::sleep(Duration::from_millis(10));

        assert!(cache.scan_prefix("adset:result:").unwrap().is_empty());
        // Only the scanned namespace is swept
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_writes_sweep_expired_entries() {
        let cache = MemoryKeyValueCache::new();
        for i in 0..PURGE_INTERVAL - 1 {
            cache
                .set(&format!("stale:{}", i), b"x", Some(Duration::from_millis(1)))
                .unwrap();
        }
        thread::sleep(Duration::from_millis(10));
        assert_eq!(cache.len(), PURGE_INTERVAL - 1);

        cache.set("fresh", b"y", None).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_scan_prefix_only_matches_namespace() {
        let cache = MemoryKeyValueCache::new();
        cache.set("adset:result:root:", b"[]", None).unwrap();
        cache.set("adset:result:x:a=1", b"[]", None).unwrap();
        cache.set("adset:node:x", b"{}", None).unwrap();

        let keys = cache.scan_prefix("adset:result:").unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.starts_with("adset:result:")));
    }
}
