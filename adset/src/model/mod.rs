// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Decision tree data model
//!
//! Nodes live in an arena keyed by [`NodeId`]; `parent` and `children` are plain
//! id fields so a node never owns another node.

pub mod filter;
pub mod node;

pub use filter::AdsetFilter;
pub use node::{Conditions, NewNode, Node, NodeId, NodePatch, PopulatedNode};
