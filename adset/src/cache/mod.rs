// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Two-tier caching for the decision tree
//!
//! This module provides:
//! - The [`KeyValueCache`] contract (TTL get/set/delete/prefix scan)
//! - In-process and driver-backed implementations of that contract
//! - [`NodeCache`]: per-node snapshots, refreshed on every store read
//! - [`ResultCache`]: whole adsets per (start node, normalized filter)
//!
//! Caching is an optimization only. Every cache failure degrades to a miss or
//! a skipped write and is logged, never returned to the caller.

pub mod cache_config;
pub mod key_value;
pub mod memory_cache;
pub mod node_cache;
pub mod result_cache;
pub mod stored_cache;

pub use cache_config::{CacheBackend, CacheConfig};
pub use key_value::{CacheError, CacheResult, KeyValueCache};
pub use memory_cache::MemoryKeyValueCache;
pub use node_cache::NodeCache;
pub use result_cache::ResultCache;
pub use stored_cache::StoredKeyValueCache;

/// Counters kept by the cache wrappers
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub invalidations: u64,
    /// Backend failures that were degraded to a miss or skipped write
    pub errors: u64,
}

impl CacheStats {
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        if self.total_requests() == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_requests() as f64
        }
    }
}
