// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Adset - weighted decision-tree path generation
//!
//! A tree of nodes, each carrying key/value `conditions` and a relative
//! `probability` weight. Generating an adset walks from the root (or a chosen
//! start node) to a leaf, keeping only children whose conditions agree with a
//! caller's filter and drawing among them by weight.
//!
//! # Features
//!
//! - **Single-root tree**: parent/child links kept consistent on every mutation
//! - **Weighted sampling**: relative weights, unbiased selection
//! - **Two-tier caching**: node snapshots and whole adsets, both TTL-bounded and
//!   invalidated on tree changes
//! - **Embedded storage**: sled on disk, or fully in memory
//!
//! # Usage
//!
//! ```ignore
//! use adset::{AdsetFilter, AdsetService, NewNode};
//!
//! let service = AdsetService::in_memory()?;
//! let root = service.create_node(NewNode::new("root", 1.0))?;
//! service.create_node(NewNode::new("us", 0.3).with_condition("region", "us").with_parent(root.id()))?;
//! let adset = service.generate_adset(&AdsetFilter::new().with("region", "us"), None)?;
//! ```

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod generator;
pub mod model;
pub mod storage;
pub mod tree;

pub use cache::{CacheBackend, CacheConfig, CacheStats, KeyValueCache};
pub use self::config::{AdsetConfig, ConfigError};
pub use coordinator::{AdsetService, ServiceStats};
pub use error::{AdsetError, AdsetResult};
pub use generator::WeightedSampler;
pub use model::{AdsetFilter, Conditions, NewNode, Node, NodeId, NodePatch, PopulatedNode};
pub use storage::{NodeStore, StorageType, StoreError};

/// Adset version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Adset crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
