// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Durable tree storage
//!
//! This module provides:
//! - The [`NodeStore`] contract consumed by the tree mutator and generator
//! - [`StoredNodeStore`], the arena of node records over a key-value driver
//! - Pluggable sled / in-memory drivers

pub mod error;
pub mod node_store;
pub mod persistent;
pub mod stored_node_store;

pub use error::{StoreError, StoreResult};
pub use node_store::{NodeFields, NodeStore};
pub use persistent::{create_storage_driver, StorageDriver, StorageTree, StorageType};
pub use stored_node_store::StoredNodeStore;
