// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node store contract
//!
//! The durable side of the tree. Implementations only persist records; the
//! structural rules (single root, back-references) are enforced by the tree
//! mutator on top of this trait.

use super::error::StoreResult;
use crate::model::{Conditions, NewNode, Node, NodeId, NodePatch, PopulatedNode};

/// Fields an update may replace; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeFields {
    pub name: Option<String>,
    pub conditions: Option<Conditions>,
    pub probability: Option<f64>,
    pub children: Option<Vec<NodeId>>,
}

impl NodeFields {
    pub fn children(children: Vec<NodeId>) -> Self {
        Self {
            children: Some(children),
            ..Self::default()
        }
    }

    /// Apply to a record in place. Returns false when nothing was supplied.
    pub fn apply_to(self, node: &mut Node) -> bool {
        let mut changed = false;
        if let Some(name) = self.name {
            node.name = name;
            changed = true;
        }
        if let Some(conditions) = self.conditions {
            node.conditions = conditions;
            changed = true;
        }
        if let Some(probability) = self.probability {
            node.probability = probability;
            changed = true;
        }
        if let Some(children) = self.children {
            node.children = children;
            changed = true;
        }
        changed
    }
}

impl From<NodePatch> for NodeFields {
    fn from(patch: NodePatch) -> Self {
        Self {
            name: patch.name,
            conditions: patch.conditions,
            probability: patch.probability,
            children: None,
        }
    }
}

/// Durable storage of node records
pub trait NodeStore: Send + Sync {
    /// Persist a new record, assigning its id and timestamps
    fn insert(&self, node: NewNode) -> StoreResult<Node>;

    fn find_by_id(&self, id: NodeId) -> StoreResult<Option<Node>>;

    /// Fetch a record with its children resolved.
    ///
    /// Child ids that no longer resolve are skipped.
    fn find_by_id_with_children(&self, id: NodeId) -> StoreResult<Option<PopulatedNode>> {
        let Some(node) = self.find_by_id(id)? else {
            return Ok(None);
        };

        let mut children = Vec::with_capacity(node.children.len());
        for child_id in &node.children {
            match self.find_by_id(*child_id)? {
                Some(child) => children.push(child),
                None => log::warn!("Node {} lists missing child {}", id, child_id),
            }
        }

        Ok(Some(PopulatedNode { node, children }))
    }

    /// The single parent-less record, if any
    fn find_root(&self) -> StoreResult<Option<Node>>;

    /// Every record, unpopulated
    fn find_all(&self) -> StoreResult<Vec<Node>>;

    /// Replace the supplied fields and bump `updated_at`
    fn update_by_id(&self, id: NodeId, fields: NodeFields) -> StoreResult<Option<Node>>;

    fn delete_by_id(&self, id: NodeId) -> StoreResult<()>;

    /// Push buffered writes to durable storage
    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}
