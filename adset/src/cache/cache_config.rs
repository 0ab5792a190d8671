// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache configuration and policies

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where cached entries live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local map; entries vanish with the process
    Memory,
    /// A tree of the storage driver; entries survive restarts until they expire
    Storage,
}

impl Default for CacheBackend {
    fn default() -> Self {
        CacheBackend::Memory
    }
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "storage" => Ok(CacheBackend::Storage),
            _ => Err(format!(
                "Unknown cache backend: {}. Valid options: memory, storage",
                s
            )),
        }
    }
}

/// Cache configuration
///
/// A TTL of zero disables that tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable/disable caching entirely
    pub enabled: bool,

    /// Lifetime of node snapshots, in seconds
    pub node_ttl_secs: u64,

    /// Lifetime of generated adsets, in seconds
    pub result_ttl_secs: u64,

    /// Namespace prepended to every cache key
    pub key_prefix: String,

    pub backend: CacheBackend,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            node_ttl_secs: 300, // 5 minutes
            result_ttl_secs: 60,
            key_prefix: "adset".to_string(),
            backend: CacheBackend::Memory,
        }
    }
}

impl CacheConfig {
    /// Configuration with both tiers switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn node_ttl(&self) -> Option<Duration> {
        self.tier_ttl(self.node_ttl_secs)
    }

    pub fn result_ttl(&self) -> Option<Duration> {
        self.tier_ttl(self.result_ttl_secs)
    }

    fn tier_ttl(&self, secs: u64) -> Option<Duration> {
        if self.enabled && secs > 0 {
            Some(Duration::from_secs(secs))
        } else {
            None
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.key_prefix.is_empty() || self.key_prefix.contains(':') {
            return Err(format!(
                "Cache key prefix must be non-empty and contain no ':' (got '{}')",
                self.key_prefix
            ));
        }

        if self.node_ttl_secs > 0
            && self.result_ttl_secs > 0
            && self.result_ttl_secs > self.node_ttl_secs
        {
            return Err(format!(
                "Result cache TTL ({}s) must not exceed node cache TTL ({}s)",
                self.result_ttl_secs, self.node_ttl_secs
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.node_ttl(), Some(Duration::from_secs(300)));
        assert_eq!(config.result_ttl(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_zero_ttl_disables_tier() {
        let config = CacheConfig {
            result_ttl_secs: 0,
            ..CacheConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.result_ttl(), None);
        assert!(config.node_ttl().is_some());

        assert_eq!(CacheConfig::disabled().node_ttl(), None);
    }

    #[test]
    fn test_result_ttl_longer_than_node_ttl_is_rejected() {
        let config = CacheConfig {
            node_ttl_secs: 10,
            result_ttl_secs: 20,
            ..CacheConfig::default()
        };
        assert!(config.validate().is_err());

        let bad_prefix = CacheConfig {
            key_prefix: "a:b".to_string(),
            ..CacheConfig::default()
        };
        assert!(bad_prefix.validate().is_err());
    }
}
