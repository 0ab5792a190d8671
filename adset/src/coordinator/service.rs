// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Adset service
//!
//! Owns one instance of every component. Nothing is process-global: each
//! service is built from an explicit configuration or from injected
//! collaborators, and is shared between threads behind an `Arc`.

use log::{info, warn};
use std::sync::Arc;

use crate::cache::{
    CacheBackend, CacheConfig, CacheStats, KeyValueCache, MemoryKeyValueCache, NodeCache,
    ResultCache, StoredKeyValueCache,
};
use crate::config::AdsetConfig;
use crate::error::{AdsetError, AdsetResult};
use crate::generator::{AdsetGenerator, WeightedSampler};
use crate::model::{AdsetFilter, NewNode, Node, NodeId, NodePatch, PopulatedNode};
use crate::storage::{create_storage_driver, NodeStore, StoreError, StoredNodeStore};
use crate::tree::TreeMutator;

const CACHE_TREE: &str = "cache";

/// Snapshot of both cache tiers' counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub node_cache: CacheStats,
    pub result_cache: CacheStats,
}

pub struct AdsetService {
    store: Arc<dyn NodeStore>,
    nodes: Arc<NodeCache>,
    results: Arc<ResultCache>,
    mutator: TreeMutator,
    generator: AdsetGenerator,
}

impl AdsetService {
    /// Build a service from configuration (Simplified API)
    ///
    /// Opens the configured storage driver, the node store on it and the
    /// configured cache backend.
    pub fn from_config(config: &AdsetConfig) -> AdsetResult<Self> {
        config
            .validate()
            .map_err(|e| AdsetError::InvalidInput(e.to_string()))?;

        info!(
            "Opening adset service: {} storage at {:?}, cache {} (node ttl {}s, result ttl {}s)",
            config.storage_type,
            config.data_path,
            if config.cache.enabled { "on" } else { "off" },
            config.cache.node_ttl_secs,
            config.cache.result_ttl_secs
        );

        let driver =
            create_storage_driver(config.storage_type, &config.data_path).map_err(StoreError::from)?;

        let cache: Arc<dyn KeyValueCache> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(MemoryKeyValueCache::new()),
            CacheBackend::Storage => {
                let stored =
                    StoredKeyValueCache::new(driver.open_tree(CACHE_TREE).map_err(StoreError::from)?);
                // Rows left behind by earlier runs
                match stored.purge_expired() {
                    Ok(0) => {}
                    Ok(purged) => info!("Purged {} expired cache entries", purged),
                    Err(e) => warn!("Failed to purge expired cache entries: {}", e),
                }
                Arc::new(stored)
            }
        };
        let store = Arc::new(StoredNodeStore::new(driver)?);

        Ok(Self::new(store, cache, &config.cache, WeightedSampler::new()))
    }

    /// Fully in-memory service with default cache settings
    pub fn in_memory() -> AdsetResult<Self> {
        Self::from_config(&AdsetConfig::in_memory())
    }

    /// Build a service from explicit collaborators (Advanced API)
    pub fn new(
        store: Arc<dyn NodeStore>,
        cache: Arc<dyn KeyValueCache>,
        cache_config: &CacheConfig,
        sampler: WeightedSampler,
    ) -> Self {
        let nodes = Arc::new(NodeCache::new(
            store.clone(),
            cache.clone(),
            &cache_config.key_prefix,
            cache_config.node_ttl(),
        ));
        let results = Arc::new(ResultCache::new(
            cache,
            &cache_config.key_prefix,
            cache_config.result_ttl(),
        ));

        Self {
            mutator: TreeMutator::new(store.clone(), nodes.clone(), results.clone()),
            generator: AdsetGenerator::new(nodes.clone(), results.clone(), sampler),
            store,
            nodes,
            results,
        }
    }

    /// Create a node; the root when `parent_id` is absent
    pub fn create_node(&self, new_node: NewNode) -> AdsetResult<PopulatedNode> {
        self.mutator.create(new_node)
    }

    /// Every node, children left as ids
    pub fn list_nodes(&self) -> AdsetResult<Vec<Node>> {
        Ok(self.store.find_all()?)
    }

    pub fn get_node(&self, id: NodeId) -> AdsetResult<PopulatedNode> {
        self.nodes
            .get_node(id)?
            .ok_or_else(|| AdsetError::node_not_found(id))
    }

    pub fn get_root(&self) -> AdsetResult<PopulatedNode> {
        self.nodes
            .get_root()?
            .ok_or_else(|| AdsetError::NotFound("root node".to_string()))
    }

    pub fn update_node(&self, id: NodeId, patch: NodePatch) -> AdsetResult<Node> {
        self.mutator.update(id, patch)
    }

    /// Delete a node with its subtree; returns how many nodes were removed
    pub fn delete_node(&self, id: NodeId) -> AdsetResult<usize> {
        self.mutator.delete(id)
    }

    /// Generate one adset from `start` (the root when `None`)
    pub fn generate_adset(
        &self,
        filter: &AdsetFilter,
        start: Option<NodeId>,
    ) -> AdsetResult<Vec<Node>> {
        self.generator.generate(filter, start)
    }

    /// Last cached snapshot of a node, without reading the store
    pub fn cached_node(&self, id: NodeId) -> Option<PopulatedNode> {
        self.nodes.cached(id)
    }

    /// Drop every cached adset; returns how many were removed
    pub fn clear_result_cache(&self) -> usize {
        self.results.invalidate_all()
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            node_cache: self.nodes.stats(),
            result_cache: self.results.stats(),
        }
    }

    /// Push buffered store writes to disk
    pub fn flush(&self) -> AdsetResult<()> {
        Ok(self.store.flush()?)
    }
}
