// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node store over a key-value storage driver
//!
//! Records are bincode-encoded in the `nodes` tree keyed by the 16 raw id
//! bytes. The root id is kept under `root` in the `metadata` tree so the root
//! lookup does not scan.

use chrono::Utc;
use log::{debug, info, trace};

use super::error::{StoreError, StoreResult};
use super::node_store::{NodeFields, NodeStore};
use super::persistent::factory::BoxedStorageDriver;
use super::persistent::{create_storage_driver, StorageTree, StorageType};
use crate::model::{NewNode, Node, NodeId};
use std::path::Path;

const NODES_TREE: &str = "nodes";
const METADATA_TREE: &str = "metadata";
const ROOT_KEY: &[u8] = b"root";

/// [`NodeStore`] backed by a sled or in-memory driver
pub struct StoredNodeStore {
    driver: BoxedStorageDriver,
    nodes: Box<dyn StorageTree>,
    metadata: Box<dyn StorageTree>,
}

impl StoredNodeStore {
    /// Open the store on an existing driver, creating its trees if needed
    pub fn new(driver: BoxedStorageDriver) -> StoreResult<Self> {
        let nodes = driver.open_tree(NODES_TREE)?;
        let metadata = driver.open_tree(METADATA_TREE)?;
        info!(
            "Node store opened on {} driver ({} and {} trees)",
            driver.storage_type(),
            NODES_TREE,
            METADATA_TREE
        );
        Ok(Self {
            driver,
            nodes,
            metadata,
        })
    }

    /// Create the driver and open the store in one step
    pub fn open<P: AsRef<Path>>(storage_type: StorageType, path: P) -> StoreResult<Self> {
        let driver = create_storage_driver(storage_type, path)?;
        Self::new(driver)
    }

    /// In-memory store, mostly for tests
    pub fn in_memory() -> StoreResult<Self> {
        Self::open(StorageType::Memory, "")
    }

    pub fn storage_type(&self) -> StorageType {
        self.driver.storage_type()
    }

    fn write(&self, node: &Node) -> StoreResult<()> {
        let bytes = bincode::serialize(node)?;
        self.nodes.insert(node.id.as_bytes(), &bytes)?;
        trace!("Wrote node {} ({} bytes)", node.id, bytes.len());
        Ok(())
    }

    fn decode(bytes: &[u8]) -> StoreResult<Node> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl NodeStore for StoredNodeStore {
    fn insert(&self, new_node: NewNode) -> StoreResult<Node> {
        let now = Utc::now();
        let node = Node {
            id: NodeId::new(),
            name: new_node.name,
            conditions: new_node.conditions,
            probability: new_node.probability,
            parent: new_node.parent_id,
            children: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.write(&node)?;
        if node.parent.is_none() {
            self.metadata.insert(ROOT_KEY, node.id.as_bytes())?;
        }

        debug!("Inserted node {} ('{}')", node.id, node.name);
        Ok(node)
    }

    fn find_by_id(&self, id: NodeId) -> StoreResult<Option<Node>> {
        match self.nodes.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn find_root(&self) -> StoreResult<Option<Node>> {
        let Some(raw) = self.metadata.get(ROOT_KEY)? else {
            return Ok(None);
        };
        let bytes: [u8; 16] = raw
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Corrupt(format!("root id has {} bytes", raw.len())))?;
        self.find_by_id(NodeId::from_bytes(bytes))
    }

    fn find_all(&self) -> StoreResult<Vec<Node>> {
        let mut nodes = Vec::new();
        for entry in self.nodes.iter()? {
            let (_, value) = entry?;
            nodes.push(Self::decode(&value)?);
        }
        Ok(nodes)
    }

    fn update_by_id(&self, id: NodeId, fields: NodeFields) -> StoreResult<Option<Node>> {
        let Some(mut node) = self.find_by_id(id)? else {
            return Ok(None);
        };
        if fields.apply_to(&mut node) {
            node.updated_at = Utc::now();
            self.write(&node)?;
        }
        Ok(Some(node))
    }

    fn delete_by_id(&self, id: NodeId) -> StoreResult<()> {
        self.nodes.remove(id.as_bytes())?;
        if self.metadata.get(ROOT_KEY)?.as_deref() == Some(id.as_bytes().as_slice()) {
            self.metadata.remove(ROOT_KEY)?;
            info!("Root node {} removed", id);
        }
        debug!("Deleted node {}", id);
        Ok(())
    }

    fn flush(&self) -> StoreResult<()> {
        self.driver.flush()?;
        Ok(())
    }
}
