// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Adset generator
//!
//! Walks from the start node (the root by default) down to a leaf. At each
//! step the children are narrowed to those whose conditions agree with the
//! filter and one of them is drawn by weight. The walk is an explicit loop, so
//! tree depth never grows the call stack.

use log::{debug, trace};
use std::collections::HashSet;
use std::sync::Arc;

use super::sampler::WeightedSampler;
use crate::cache::{NodeCache, ResultCache};
use crate::error::{AdsetError, AdsetResult};
use crate::model::{AdsetFilter, Node, NodeId, PopulatedNode};
use crate::storage::StoreError;

pub struct AdsetGenerator {
    nodes: Arc<NodeCache>,
    results: Arc<ResultCache>,
    sampler: WeightedSampler,
}

impl AdsetGenerator {
    pub fn new(nodes: Arc<NodeCache>, results: Arc<ResultCache>, sampler: WeightedSampler) -> Self {
        Self {
            nodes,
            results,
            sampler,
        }
    }

    /// Produce one adset for `filter`, starting at `start` or the root.
    ///
    /// A cached adset for the same start and normalized filter is returned
    /// unchanged while it lives.
    pub fn generate(&self, filter: &AdsetFilter, start: Option<NodeId>) -> AdsetResult<Vec<Node>> {
        if let Some(adset) = self.results.get(start, filter) {
            return Ok(adset);
        }

        let adset = self.walk(filter, start)?;
        debug!(
            "Generated adset of {} nodes from {} for filter '{}'",
            adset.len(),
            start.map_or_else(|| "root".to_string(), |id| id.to_string()),
            filter.normalized()
        );

        self.results.put(start, filter, &adset);
        Ok(adset)
    }

    /// Uncached walk; always draws a fresh path
    pub fn walk(&self, filter: &AdsetFilter, start: Option<NodeId>) -> AdsetResult<Vec<Node>> {
        let mut current = self.resolve_start(start)?;
        let mut adset = Vec::new();
        let mut visited = HashSet::new();

        loop {
            if !visited.insert(current.id()) {
                return Err(StoreError::Corrupt(format!(
                    "node {} is its own ancestor",
                    current.id()
                ))
                .into());
            }

            if current.is_leaf() {
                adset.push(current.node);
                return Ok(adset);
            }

            let eligible: Vec<&Node> = current
                .children
                .iter()
                .filter(|child| child.is_eligible(filter))
                .collect();

            let next_id = match self.sampler.pick(&eligible, |child| child.probability) {
                Some(index) => eligible[index].id,
                None => {
                    return Err(AdsetError::NoEligibleChild {
                        node_id: current.id(),
                    })
                }
            };
            trace!(
                "Node {} -> {} ({} of {} children eligible)",
                current.id(),
                next_id,
                eligible.len(),
                current.children.len()
            );

            adset.push(current.node);
            current = self
                .nodes
                .get_node(next_id)?
                .ok_or_else(|| AdsetError::node_not_found(next_id))?;
        }
    }

    fn resolve_start(&self, start: Option<NodeId>) -> AdsetResult<PopulatedNode> {
        match start {
            Some(id) => self
                .nodes
                .get_node(id)?
                .ok_or_else(|| AdsetError::node_not_found(id)),
            None => self
                .nodes
                .get_root()?
                .ok_or_else(|| AdsetError::NotFound("root node".to_string())),
        }
    }
}
