// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver traits
//!
//! All drivers implement these traits to give the node store and the stored
//! cache one consistent interface.

use super::types::{StorageResult, StorageType};
use std::path::Path;

/// Boxed iterator over `(key, value)` pairs returned by scans
pub type KeyValueIter<'a> = Box<dyn Iterator<Item = StorageResult<(Vec<u8>, Vec<u8>)>> + 'a>;

/// A named collection of key-value pairs within a storage driver.
///
/// Similar to a table in SQL databases or a column family in NoSQL databases.
pub trait StorageTree: Send + Sync {
    /// Insert a key-value pair, replacing any previous value
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Get a value by key
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Remove a key-value pair
    fn remove(&self, key: &[u8]) -> StorageResult<()>;

    /// Check if a key exists
    fn contains_key(&self, key: &[u8]) -> StorageResult<bool>;

    /// Clear all data in the tree
    fn clear(&self) -> StorageResult<()>;

    /// Check if the tree is empty
    fn is_empty(&self) -> StorageResult<bool>;

    /// Iterate over all key-value pairs
    fn iter(&self) -> StorageResult<KeyValueIter<'_>>;

    /// Scan with a key prefix
    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<KeyValueIter<'_>>;

    /// Flush any pending writes to disk
    fn flush(&self) -> StorageResult<()>;
}

/// Main storage driver trait
///
/// Opens the database and hands out named trees.
pub trait StorageDriver: Send + Sync {
    /// Type of tree used by this driver
    type Tree: StorageTree;

    /// Open or create a storage driver at the given path
    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self>
    where
        Self: Sized;

    /// Open or create a named tree
    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree>;

    /// List all available trees
    fn list_trees(&self) -> StorageResult<Vec<String>>;

    /// Flush all pending writes to disk
    fn flush(&self) -> StorageResult<()>;

    /// Get storage type
    fn storage_type(&self) -> StorageType;

    /// Release the driver before dropping it
    fn shutdown(&mut self) -> StorageResult<()> {
        self.flush()
    }
}

// Lets boxed trees be used wherever a concrete tree is expected
impl StorageTree for Box<dyn StorageTree> {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        (**self).insert(key, value)
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn remove(&self, key: &[u8]) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn contains_key(&self, key: &[u8]) -> StorageResult<bool> {
        (**self).contains_key(key)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }

    fn is_empty(&self) -> StorageResult<bool> {
        (**self).is_empty()
    }

    fn iter(&self) -> StorageResult<KeyValueIter<'_>> {
        (**self).iter()
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<KeyValueIter<'_>> {
        (**self).scan_prefix(prefix)
    }

    fn flush(&self) -> StorageResult<()> {
        (**self).flush()
    }
}
