// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! TTL key-value cache contract

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::storage::persistent::StorageDriverError;

/// Errors raised by a [`KeyValueCache`] backend
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Storage driver error: {0}")]
    Driver(#[from] StorageDriverError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt cache entry '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Generic TTL-bounded key-value store
///
/// Implementations synchronize internally; every method may be called from
/// many threads at once.
pub trait KeyValueCache: Send + Sync {
    /// Value for `key`, or `None` when absent or expired
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store `value`; `None` keeps it until deleted
    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()>;

    fn delete(&self, key: &str) -> CacheResult<()>;

    /// Live keys starting with `prefix`
    fn scan_prefix(&self, prefix: &str) -> CacheResult<Vec<String>>;
}

/// Fetch and decode a JSON document
pub fn get_json<T: DeserializeOwned>(
    cache: &dyn KeyValueCache,
    key: &str,
) -> CacheResult<Option<T>> {
    match cache.get(key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode and store a JSON document
pub fn set_json<T: Serialize + ?Sized>(
    cache: &dyn KeyValueCache,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> CacheResult<()> {
    let bytes = serde_json::to_vec(value)?;
    cache.set(key, &bytes, ttl)
}
