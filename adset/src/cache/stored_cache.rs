// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! TTL cache kept in a storage driver tree
//!
//! Each value is stored as an 8-byte big-endian expiry (Unix milliseconds,
//! zero for "never") followed by the payload.

use chrono::Utc;
use log::trace;
use std::time::Duration;

use super::key_value::{CacheError, CacheResult, KeyValueCache};
use crate::storage::persistent::StorageTree;

const EXPIRY_LEN: usize = 8;

/// [`KeyValueCache`] over a sled or in-memory tree
pub struct StoredKeyValueCache {
    tree: Box<dyn StorageTree>,
}

impl StoredKeyValueCache {
    pub fn new(tree: Box<dyn StorageTree>) -> Self {
        Self { tree }
    }

    fn encode(value: &[u8], ttl: Option<Duration>) -> Vec<u8> {
        let expires_at = match ttl {
            Some(ttl) => Utc::now().timestamp_millis().max(0) as u64 + ttl.as_millis() as u64,
            None => 0,
        };
        let mut bytes = Vec::with_capacity(EXPIRY_LEN + value.len());
        bytes.extend_from_slice(&expires_at.to_be_bytes());
        bytes.extend_from_slice(value);
        bytes
    }

    /// Split a stored value; `None` when it has expired
    fn decode(key: &[u8], bytes: &[u8], now_ms: u64) -> CacheResult<Option<Vec<u8>>> {
        if bytes.len() < EXPIRY_LEN {
            return Err(CacheError::Corrupt {
                key: String::from_utf8_lossy(key).to_string(),
                reason: format!("{} bytes is shorter than the expiry header", bytes.len()),
            });
        }
        let (header, payload) = bytes.split_at(EXPIRY_LEN);
        let mut expiry = [0u8; EXPIRY_LEN];
        expiry.copy_from_slice(header);
        let expires_at = u64::from_be_bytes(expiry);

        if expires_at != 0 && now_ms >= expires_at {
            return Ok(None);
        }
        Ok(Some(payload.to_vec()))
    }

    fn now_ms() -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    /// Remove expired rows under `prefix`, returning the live keys
    fn sweep(&self, prefix: &[u8]) -> CacheResult<(Vec<String>, usize)> {
        let now_ms = Self::now_ms();
        let mut live = Vec::new();
        let mut expired = Vec::new();
        for entry in self.tree.scan_prefix(prefix)? {
            let (key, value) = entry?;
            if Self::decode(&key, &value, now_ms)?.is_some() {
                live.push(String::from_utf8_lossy(&key).to_string());
            } else {
                expired.push(key);
            }
        }

        for key in &expired {
            self.tree.remove(key)?;
        }
        if !expired.is_empty() {
            trace!("Removed {} expired cache rows", expired.len());
        }
        Ok((live, expired.len()))
    }

    /// Drop every expired row, returning how many were removed
    pub fn purge_expired(&self) -> CacheResult<usize> {
        self.sweep(b"").map(|(_, removed)| removed)
    }
}

impl KeyValueCache for StoredKeyValueCache {
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let Some(bytes) = self.tree.get(key.as_bytes())? else {
            return Ok(None);
        };
        let value = Self::decode(key.as_bytes(), &bytes, Self::now_ms())?;
        if value.is_none() {
            trace!("Dropping expired cache entry {}", key);
            self.tree.remove(key.as_bytes())?;
        }
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        self.tree.insert(key.as_bytes(), &Self::encode(value, ttl))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        self.tree.remove(key.as_bytes())?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        self.sweep(prefix.as_bytes()).map(|(keys, _)| keys)
    }
}
