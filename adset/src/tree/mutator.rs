// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Tree mutator
//!
//! Every create, update and delete passes through here so that:
//! - at most one parent-less node exists
//! - a node is listed in its parent's `children` exactly while it exists
//! - node snapshots touching the change and all cached adsets are dropped
//!
//! Writes are last-write-wins at the store; nothing here locks across calls.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::{NodeCache, ResultCache};
use crate::error::{AdsetError, AdsetResult};
use crate::model::{NewNode, Node, NodeId, NodePatch, PopulatedNode};
use crate::storage::{NodeFields, NodeStore};

pub struct TreeMutator {
    store: Arc<dyn NodeStore>,
    nodes: Arc<NodeCache>,
    results: Arc<ResultCache>,
}

impl TreeMutator {
    pub fn new(store: Arc<dyn NodeStore>, nodes: Arc<NodeCache>, results: Arc<ResultCache>) -> Self {
        Self {
            store,
            nodes,
            results,
        }
    }

    /// Create a node: the root when no parent is given, otherwise a child of
    /// an existing node. Returns the stored node with its (empty) children.
    pub fn create(&self, new_node: NewNode) -> AdsetResult<PopulatedNode> {
        new_node.validate()?;

        let parent = match new_node.parent_id {
            None => {
                if let Some(root) = self.store.find_root()? {
                    return Err(AdsetError::Conflict(format!(
                        "root node already exists ({})",
                        root.id
                    )));
                }
                None
            }
            Some(parent_id) => Some(
                self.store
                    .find_by_id(parent_id)?
                    .ok_or_else(|| AdsetError::NotFound(format!("parent node {}", parent_id)))?,
            ),
        };

        let node = self.store.insert(new_node)?;

        if let Some(parent) = parent {
            let mut children = parent.children;
            children.push(node.id);
            if self
                .store
                .update_by_id(parent.id, NodeFields::children(children))?
                .is_none()
            {
                // Parent vanished between the lookup and the attach
                self.store.delete_by_id(node.id)?;
                return Err(AdsetError::NotFound(format!("parent node {}", parent.id)));
            }
            self.nodes.invalidate(parent.id);
        }

        self.results.invalidate_all();
        info!(
            "Created node {} ('{}') under {}",
            node.id,
            node.name,
            node.parent
                .map_or_else(|| "no parent (root)".to_string(), |id| id.to_string())
        );

        self.nodes
            .get_node(node.id)?
            .ok_or_else(|| AdsetError::node_not_found(node.id))
    }

    /// Replace the supplied fields of a node; structure is left untouched
    pub fn update(&self, id: NodeId, patch: NodePatch) -> AdsetResult<Node> {
        patch.validate()?;

        let node = self
            .store
            .update_by_id(id, NodeFields::from(patch))?
            .ok_or_else(|| AdsetError::node_not_found(id))?;

        self.nodes.invalidate(id);
        // The parent's snapshot embeds this node's record
        if let Some(parent_id) = node.parent {
            self.nodes.invalidate(parent_id);
        }
        self.results.invalidate_all();

        info!("Updated node {}", id);
        Ok(node)
    }

    /// Delete a node and its whole subtree, detaching it from its parent.
    ///
    /// Returns the number of nodes removed.
    pub fn delete(&self, id: NodeId) -> AdsetResult<usize> {
        let node = self
            .store
            .find_by_id(id)?
            .ok_or_else(|| AdsetError::node_not_found(id))?;

        if let Some(parent_id) = node.parent {
            match self.store.find_by_id(parent_id)? {
                Some(parent) => {
                    let children: Vec<NodeId> =
                        parent.children.into_iter().filter(|c| *c != id).collect();
                    self.store
                        .update_by_id(parent_id, NodeFields::children(children))?;
                }
                None => warn!("Node {} points at missing parent {}", id, parent_id),
            }
            self.nodes.invalidate(parent_id);
        }

        // Children before parents, the node itself last
        let doomed = self.subtree_of(&node)?;
        for doomed_id in doomed.iter().rev() {
            self.store.delete_by_id(*doomed_id)?;
            self.nodes.invalidate(*doomed_id);
        }

        self.results.invalidate_all();
        info!("Deleted node {} with {} descendants", id, doomed.len() - 1);
        Ok(doomed.len())
    }

    /// Pre-order ids of `node` and every node below it
    fn subtree_of(&self, node: &Node) -> AdsetResult<Vec<NodeId>> {
        let mut order = vec![node.id];
        let mut seen: HashSet<NodeId> = HashSet::from([node.id]);
        let mut stack: Vec<NodeId> = node.children.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            match self.store.find_by_id(id)? {
                Some(child) => {
                    order.push(id);
                    stack.extend(child.children.iter().rev().copied());
                }
                None => debug!("Skipping dangling child {}", id),
            }
        }
        Ok(order)
    }
}
