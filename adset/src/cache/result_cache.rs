// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Generated adset caching
//!
//! Entries are keyed by start node (or `root`) and the normalized filter.
//! Any structural change to the tree invalidates the whole namespace: a path
//! can depend on every node reachable from its start.

use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use super::key_value::{get_json, set_json, KeyValueCache};
use super::CacheStats;
use crate::model::{AdsetFilter, Node, NodeId};

const ROOT_SEGMENT: &str = "root";

pub struct ResultCache {
    cache: Arc<dyn KeyValueCache>,
    namespace: String,
    /// `None` disables the tier
    ttl: Option<Duration>,
    stats: RwLock<CacheStats>,
}

impl ResultCache {
    pub fn new(cache: Arc<dyn KeyValueCache>, key_prefix: &str, ttl: Option<Duration>) -> Self {
        Self {
            cache,
            namespace: format!("{}:result:", key_prefix),
            ttl,
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Cache key for a (start, filter) pair
    pub fn key(&self, start: Option<NodeId>, filter: &AdsetFilter) -> String {
        let start = start.map_or_else(|| ROOT_SEGMENT.to_string(), |id| id.to_string());
        format!("{}{}:{}", self.namespace, start, filter.normalized())
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    pub fn get(&self, start: Option<NodeId>, filter: &AdsetFilter) -> Option<Vec<Node>> {
        if !self.is_enabled() {
            return None;
        }
        let key = self.key(start, filter);
        match get_json::<Vec<Node>>(self.cache.as_ref(), &key) {
            Ok(Some(adset)) => {
                debug!("Result cache hit for {}", key);
                self.stats.write().hits += 1;
                Some(adset)
            }
            Ok(None) => {
                self.stats.write().misses += 1;
                None
            }
            Err(e) => {
                warn!("Result cache read for {} failed, treating as miss: {}", key, e);
                let mut stats = self.stats.write();
                stats.misses += 1;
                stats.errors += 1;
                None
            }
        }
    }

    pub fn put(&self, start: Option<NodeId>, filter: &AdsetFilter, adset: &[Node]) {
        let Some(ttl) = self.ttl else {
            return;
        };
        let key = self.key(start, filter);
        match set_json(self.cache.as_ref(), &key, adset, Some(ttl)) {
            Ok(()) => self.stats.write().insertions += 1,
            Err(e) => {
                warn!("Result cache write for {} failed, skipping: {}", key, e);
                self.stats.write().errors += 1;
            }
        }
    }

    /// Remove every cached adset, returning how many entries were deleted
    pub fn invalidate_all(&self) -> usize {
        let keys = match self.cache.scan_prefix(&self.namespace) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Result cache scan failed, entries expire by TTL: {}", e);
                self.stats.write().errors += 1;
                return 0;
            }
        };

        let mut removed = 0;
        for key in &keys {
            match self.cache.delete(key) {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!("Result cache delete of {} failed: {}", key, e);
                    self.stats.write().errors += 1;
                }
            }
        }

        self.stats.write().invalidations += removed as u64;
        if removed > 0 {
            info!("Invalidated {} cached adsets", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryKeyValueCache, StoredKeyValueCache};
    use crate::storage::persistent::memory::MemoryStorageDriver;
    use crate::storage::persistent::{StorageDriver, StorageTree};
    use chrono::Utc;
    use std::thread;

    fn leaf(name: &str) -> Node {
        let now = Utc::now();
        Node {
            id: NodeId::new(),
            name: name.to_string(),
            conditions: Default::default(),
            probability: 1.0,
            parent: None,
            children: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn result_cache(ttl: Option<Duration>) -> ResultCache {
        ResultCache::new(Arc::new(MemoryKeyValueCache::new()), "adset", ttl)
    }

    #[test]
    fn test_key_is_insertion_order_independent() {
        let cache = result_cache(Some(Duration::from_secs(60)));
        let ab = AdsetFilter::new().with("a", "1").with("b", "2");
        let ba = AdsetFilter::new().with("b", "2").with("a", "1");
        assert_eq!(cache.key(None, &ab), cache.key(None, &ba));
        assert_eq!(cache.key(None, &ab), r#"adset:result:root:{"a":"1","b":"2"}"#);
    }

    #[test]
    fn test_put_then_get() {
        let cache = result_cache(Some(Duration::from_secs(60)));
        let filter = AdsetFilter::new().with("region", "us");
        let adset = vec![leaf("root")];

        assert!(cache.get(None, &filter).is_none());
        cache.put(None, &filter, &adset);
        assert_eq!(cache.get(None, &filter), Some(adset));
        // Different start node, different entry
        assert!(cache.get(Some(NodeId::new()), &filter).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_invalidate_all_leaves_other_namespaces() {
        let kv = Arc::new(MemoryKeyValueCache::new());
        kv.set("adset:node:x", b"{}", None).unwrap();
        let cache = ResultCache::new(kv.clone(), "adset", Some(Duration::from_secs(60)));

        cache.put(None, &AdsetFilter::new(), &[leaf("a")]);
        cache.put(None, &AdsetFilter::new().with("k", "v"), &[leaf("b")]);

        assert_eq!(cache.invalidate_all(), 2);
        assert!(cache.get(None, &AdsetFilter::new()).is_none());
        assert_eq!(kv.get("adset:node:x").unwrap(), Some(b"{}".to_vec()));
    }

    fn fill_with_short_lived(cache: &ResultCache) {
        for i in 0..500 {
            let filter = AdsetFilter::new().with("n", i.to_string());
            cache.put(None, &filter, &[leaf("a")]);
        }
        thread::sleep(Duration::from_millis(20));
    }

    #[test]
    fn test_invalidate_all_reclaims_expired_memory_entries() {
        let kv = Arc::new(MemoryKeyValueCache::new());
        let cache = ResultCache::new(kv.clone(), "adset", Some(Duration::from_millis(1)));
        fill_with_short_lived(&cache);

        assert_eq!(cache.invalidate_all(), 0);
        assert!(kv.is_empty());
    }

    #[test]
    fn test_invalidate_all_reclaims_expired_stored_entries() {
        let driver = MemoryStorageDriver::new();
        let kv = Arc::new(StoredKeyValueCache::new(driver.open_tree("cache").unwrap()));
        let cache = ResultCache::new(kv, "adset", Some(Duration::from_millis(1)));
        fill_with_short_lived(&cache);

        assert_eq!(cache.invalidate_all(), 0);
        assert!(driver.open_tree("cache").unwrap().is_empty().unwrap());
    }

    #[test]
    fn test_disabled_tier_never_stores() {
        let cache = result_cache(None);
        cache.put(None, &AdsetFilter::new(), &[leaf("a")]);
        assert!(cache.get(None, &AdsetFilter::new()).is_none());
        assert_eq!(cache.stats().insertions, 0);
    }
}
