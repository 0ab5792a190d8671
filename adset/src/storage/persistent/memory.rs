// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory storage driver implementation

use super::traits::{KeyValueIter, StorageDriver, StorageTree};
use super::types::{StorageResult, StorageType};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

type TreeData = Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>;

/// In-memory storage driver
///
/// Trees opened under the same name share their data, like named trees of an
/// on-disk database.
#[derive(Default)]
pub struct MemoryStorageDriver {
    trees: Arc<RwLock<BTreeMap<String, TreeData>>>,
}

/// In-memory tree implementation
///
/// Keys are kept ordered so scans behave like sled's.
pub struct MemoryTree {
    data: TreeData,
}

impl MemoryStorageDriver {
    /// Create a new memory storage driver
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryTree {
    fn snapshot<F>(&self, keep: F) -> KeyValueIter<'_>
    where
        F: Fn(&[u8]) -> bool,
    {
        let items: Vec<_> = self
            .data
            .read()
            .iter()
            .filter(|(k, _)| keep(k.as_slice()))
            .map(|(k, v)| Ok((k.clone(), v.clone())))
            .collect();
        Box::new(items.into_iter())
    }
}

impl StorageTree for MemoryTree {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn remove(&self, key: &[u8]) -> StorageResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn contains_key(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.data.read().contains_key(key))
    }

    fn clear(&self) -> StorageResult<()> {
        self.data.write().clear();
        Ok(())
    }

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.data.read().is_empty())
    }

    fn iter(&self) -> StorageResult<KeyValueIter<'_>> {
        Ok(self.snapshot(|_| true))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<KeyValueIter<'_>> {
        Ok(self.snapshot(|k| k.starts_with(prefix)))
    }

    fn flush(&self) -> StorageResult<()> {
        // No-op for memory storage
        Ok(())
    }
}

impl StorageDriver for MemoryStorageDriver {
    type Tree = Box<dyn StorageTree>;

    fn open<P: AsRef<Path>>(_path: P) -> StorageResult<Self> {
        Ok(Self::new())
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        let data = self
            .trees
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(BTreeMap::new())))
            .clone();

        Ok(Box::new(MemoryTree { data }) as Box<dyn StorageTree>)
    }

    fn list_trees(&self) -> StorageResult<Vec<String>> {
        Ok(self.trees.read().keys().cloned().collect())
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trees_with_same_name_share_data() {
        let driver = MemoryStorageDriver::new();
        let first = driver.open_tree("nodes").unwrap();
        let second = driver.open_tree("nodes").unwrap();

        first.insert(b"a", b"1").unwrap();
        assert_eq!(second.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(driver.list_trees().unwrap(), vec!["nodes".to_string()]);
    }

    #[test]
    fn test_scan_prefix_is_ordered_and_filtered() {
        let driver = MemoryStorageDriver::new();
        let tree = driver.open_tree("cache").unwrap();
        tree.insert(b"result:b", b"2").unwrap();
        tree.insert(b"node:x", b"0").unwrap();
        tree.insert(b"result:a", b"1").unwrap();

        let keys: Vec<Vec<u8>> = tree
            .scan_prefix(b"result:")
            .unwrap()
            .map(|entry| entry.unwrap().0)
            .collect();
        assert_eq!(keys, vec![b"result:a".to_vec(), b"result:b".to_vec()]);

        tree.clear().unwrap();
        assert!(tree.is_empty().unwrap());
    }
}
