// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node entity and request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::filter::AdsetFilter;
use crate::error::AdsetError;

/// Key/value constraints a node imposes on the caller's filter
pub type Conditions = BTreeMap<String, String>;

/// Stable node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Raw bytes used as the storage key
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for NodeId {
    type Err = AdsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(NodeId)
            .map_err(|_| AdsetError::NotFound(format!("node '{}' (malformed id)", s)))
    }
}

/// One decision point in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub conditions: Conditions,
    /// Relative sampling weight among siblings, within [0, 1]
    pub probability: f64,
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True when no condition disagrees with a key present in the filter.
    pub fn is_eligible(&self, filter: &AdsetFilter) -> bool {
        self.conditions
            .iter()
            .all(|(key, value)| filter.get(key).map_or(true, |wanted| wanted == value))
    }
}

/// A node together with the records of its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulatedNode {
    pub node: Node,
    pub children: Vec<Node>,
}

impl PopulatedNode {
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Fields of a node to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNode {
    pub name: String,
    #[serde(default)]
    pub conditions: Conditions,
    pub probability: f64,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
}

impl NewNode {
    pub fn new(name: impl Into<String>, probability: f64) -> Self {
        Self {
            name: name.into(),
            conditions: Conditions::new(),
            probability,
            parent_id: None,
        }
    }

    pub fn with_condition(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    pub fn with_parent(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn validate(&self) -> Result<(), AdsetError> {
        validate_name(&self.name)?;
        validate_probability(self.probability)
    }
}

/// Partial update of a node's own fields; structure is never patched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub conditions: Option<Conditions>,
    #[serde(default)]
    pub probability: Option<f64>,
}

impl NodePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.conditions.is_none() && self.probability.is_none()
    }

    pub fn validate(&self) -> Result<(), AdsetError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(probability) = self.probability {
            validate_probability(probability)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), AdsetError> {
    if name.trim().is_empty() {
        return Err(AdsetError::InvalidInput(
            "node name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_probability(probability: f64) -> Result<(), AdsetError> {
    // NaN fails the range check too
    if !(0.0..=1.0).contains(&probability) {
        return Err(AdsetError::InvalidInput(format!(
            "probability must be within [0, 1], got {}",
            probability
        )));
    }
    Ok(())
}
