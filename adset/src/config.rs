// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Service configuration
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Optional JSON file
//! 3. Environment variables: `ADSET_*` prefix, `__` between nested keys
//!    (`ADSET_STORAGE_TYPE`, `ADSET_CACHE__RESULT_TTL_SECS`, ...)

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cache::CacheConfig;
use crate::storage::StorageType;

pub const ENV_PREFIX: &str = "ADSET";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration of an [`crate::AdsetService`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdsetConfig {
    pub storage_type: StorageType,

    /// Database directory (ignored by the memory driver)
    pub data_path: PathBuf,

    pub cache: CacheConfig,
}

impl Default for AdsetConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Sled,
            data_path: PathBuf::from("./adset-data"),
            cache: CacheConfig::default(),
        }
    }
}

impl AdsetConfig {
    /// Ephemeral configuration with every component in memory
    pub fn in_memory() -> Self {
        Self {
            storage_type: StorageType::Memory,
            ..Self::default()
        }
    }

    /// Defaults, then `file` when given, then the `ADSET_*` environment
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::layered(file, Self::environment())
    }

    /// Defaults overlaid with the `ADSET_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Defaults overlaid with a JSON file only; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(Self::json_file(path.as_ref()))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    fn json_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
        File::from(path).format(FileFormat::Json).required(true)
    }

    fn layered(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = file {
            builder = builder.add_source(Self::json_file(path));
        }

        let config: Self = builder.add_source(env).build()?.try_deserialize()?;
        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate().map_err(ConfigError::Invalid)?;
        if self.storage_type == StorageType::Sled && self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "sled storage needs a data path".to_string(),
            ));
        }
        Ok(())
    }
}
