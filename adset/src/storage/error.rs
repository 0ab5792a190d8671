// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node store error types

use super::persistent::StorageDriverError;
use thiserror::Error;

/// Errors raised by a [`super::NodeStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage driver error: {0}")]
    Driver(#[from] StorageDriverError),

    #[error("Record encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
