// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Errors reported by the core operations

use crate::model::NodeId;
use crate::storage::StoreError;
use thiserror::Error;

/// Errors surfaced to callers of [`crate::AdsetService`]
#[derive(Error, Debug)]
pub enum AdsetError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No child of node {node_id} is eligible for the supplied filter")]
    NoEligibleChild { node_id: NodeId },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl AdsetError {
    pub(crate) fn node_not_found(id: NodeId) -> Self {
        AdsetError::NotFound(format!("node {}", id))
    }

    /// True for the "nothing to return" family, which request layers usually
    /// map to the same status.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AdsetError::NotFound(_) | AdsetError::NoEligibleChild { .. }
        )
    }
}

pub type AdsetResult<T> = Result<T, AdsetError>;
