// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-node snapshot cache
//!
//! Reads always go to the node store; the fetched, child-populated record is
//! then written to the key-value cache so other consumers can pick up a copy
//! within the TTL. Mutations drop the affected snapshots explicitly.

use log::{debug, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use super::key_value::{get_json, set_json, KeyValueCache};
use super::CacheStats;
use crate::model::{NodeId, PopulatedNode};
use crate::storage::{NodeStore, StoreResult};

pub struct NodeCache {
    store: Arc<dyn NodeStore>,
    cache: Arc<dyn KeyValueCache>,
    namespace: String,
    /// `None` disables snapshot writes
    ttl: Option<Duration>,
    stats: RwLock<CacheStats>,
}

impl NodeCache {
    pub fn new(
        store: Arc<dyn NodeStore>,
        cache: Arc<dyn KeyValueCache>,
        key_prefix: &str,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            store,
            cache,
            namespace: format!("{}:node:", key_prefix),
            ttl,
            stats: RwLock::new(CacheStats::default()),
        }
    }

    fn key(&self, id: NodeId) -> String {
        format!("{}{}", self.namespace, id)
    }

    /// Fetch a node with its children from the store and refresh its snapshot
    pub fn get_node(&self, id: NodeId) -> StoreResult<Option<PopulatedNode>> {
        let node = self.store.find_by_id_with_children(id)?;
        if let Some(node) = &node {
            self.remember(node);
        }
        Ok(node)
    }

    /// Fetch the current root with its children and refresh its snapshot
    pub fn get_root(&self) -> StoreResult<Option<PopulatedNode>> {
        let Some(root) = self.store.find_root()? else {
            return Ok(None);
        };
        self.get_node(root.id)
    }

    /// Last snapshot written for `id`, without touching the store
    pub fn cached(&self, id: NodeId) -> Option<PopulatedNode> {
        match get_json::<PopulatedNode>(self.cache.as_ref(), &self.key(id)) {
            Ok(Some(node)) => {
                self.stats.write().hits += 1;
                Some(node)
            }
            Ok(None) => {
                self.stats.write().misses += 1;
                None
            }
            Err(e) => {
                warn!("Node cache read for {} failed, treating as miss: {}", id, e);
                let mut stats = self.stats.write();
                stats.misses += 1;
                stats.errors += 1;
                None
            }
        }
    }

    /// Drop the snapshot of `id`
    pub fn invalidate(&self, id: NodeId) {
        match self.cache.delete(&self.key(id)) {
            Ok(()) => {
                debug!("Invalidated node snapshot {}", id);
                self.stats.write().invalidations += 1;
            }
            Err(e) => {
                warn!("Node cache invalidation for {} failed: {}", id, e);
                self.stats.write().errors += 1;
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    fn remember(&self, node: &PopulatedNode) {
        let Some(ttl) = self.ttl else {
            return;
        };
        match set_json(self.cache.as_ref(), &self.key(node.id()), node, Some(ttl)) {
            Ok(()) => self.stats.write().insertions += 1,
            Err(e) => {
                warn!("Node cache write for {} failed, skipping: {}", node.id(), e);
                self.stats.write().errors += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryKeyValueCache;
    use crate::model::NewNode;
    use crate::storage::{NodeFields, StoredNodeStore};

    fn setup(ttl: Option<Duration>) -> (Arc<StoredNodeStore>, NodeCache) {
        let store = Arc::new(StoredNodeStore::in_memory().unwrap());
        let cache = NodeCache::new(
            store.clone(),
            Arc::new(MemoryKeyValueCache::new()),
            "adset",
            ttl,
        );
        (store, cache)
    }

    #[test]
    fn test_get_node_writes_snapshot() {
        let (store, cache) = setup(Some(Duration::from_secs(60)));
        let root = store.insert(NewNode::new("root", 1.0)).unwrap();

        assert!(cache.cached(root.id).is_none());
        let fetched = cache.get_node(root.id).unwrap().unwrap();
        assert_eq!(cache.cached(root.id), Some(fetched));
        assert_eq!(cache.stats().insertions, 1);
    }

    #[test]
    fn test_get_node_always_reads_the_store() {
        let (store, cache) = setup(Some(Duration::from_secs(60)));
        let root = store.insert(NewNode::new("root", 1.0)).unwrap();
        cache.get_node(root.id).unwrap();

        store
            .update_by_id(
                root.id,
                NodeFields {
                    name: Some("renamed".to_string()),
                    ..NodeFields::default()
                },
            )
            .unwrap();

        let fetched = cache.get_node(root.id).unwrap().unwrap();
        assert_eq!(fetched.node.name, "renamed");
        assert_eq!(cache.cached(root.id).unwrap().node.name, "renamed");
    }

    #[test]
    fn test_invalidate_and_disabled_tier() {
        let (store, cache) = setup(Some(Duration::from_secs(60)));
        let root = store.insert(NewNode::new("root", 1.0)).unwrap();
        cache.get_root().unwrap().unwrap();
        cache.invalidate(root.id);
        assert!(cache.cached(root.id).is_none());

        let (store, disabled) = setup(None);
        let root = store.insert(NewNode::new("root", 1.0)).unwrap();
        assert!(disabled.get_node(root.id).unwrap().is_some());
        assert!(disabled.cached(root.id).is_none());
    }
}
