//! Test fixture for adset integration tests
//!
//! Provides isolated service instances using ONLY the public AdsetService API.

use adset::storage::StoredNodeStore;
use adset::{
    AdsetConfig, AdsetService, CacheConfig, KeyValueCache, NewNode, NodeId, StorageType,
    WeightedSampler,
};
use std::path::PathBuf;
use std::sync::Arc;

use super::init_logging;

/// Ids of the sample tree:
///
/// ```text
/// root
/// ├── us  {region: us}  0.3
/// └── eu  {region: eu}  0.7
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SampleTree {
    pub root: NodeId,
    pub us: NodeId,
    pub eu: NodeId,
}

/// Test fixture with an isolated database directory
pub struct TestFixture {
    service: Arc<AdsetService>,
    config: AdsetConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestFixture {
    /// Empty tree on a fresh sled database with default cache settings
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_config(|_| {})
    }

    /// Empty tree; `configure` may adjust the defaults before the service opens
    pub fn with_config<F>(configure: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: FnOnce(&mut AdsetConfig),
    {
        init_logging();
        let temp_dir = tempfile::tempdir()?;
        let mut config = AdsetConfig {
            storage_type: StorageType::Sled,
            data_path: temp_dir.path().join("adset_test"),
            ..AdsetConfig::default()
        };
        configure(&mut config);

        let service = AdsetService::from_config(&config)?;

        Ok(TestFixture {
            service: Arc::new(service),
            config,
            _temp_dir: temp_dir,
        })
    }

    pub fn service(&self) -> &AdsetService {
        &self.service
    }

    /// Shareable handle for multi-threaded tests
    pub fn shared(&self) -> Arc<AdsetService> {
        self.service.clone()
    }

    pub fn data_path(&self) -> PathBuf {
        self.config.data_path.clone()
    }

    /// Close the database and open it again from the same directory
    pub fn reopen(self) -> Result<Self, Box<dyn std::error::Error>> {
        self.service.flush()?;
        let TestFixture {
            service,
            config,
            _temp_dir,
        } = self;
        drop(service);

        let service = AdsetService::from_config(&config)?;
        Ok(TestFixture {
            service: Arc::new(service),
            config,
            _temp_dir,
        })
    }

    /// Build the sample tree in this fixture's service
    pub fn insert_sample_tree(&self) -> Result<SampleTree, Box<dyn std::error::Error>> {
        insert_sample_tree(&self.service)
    }
}

pub fn insert_sample_tree(
    service: &AdsetService,
) -> Result<SampleTree, Box<dyn std::error::Error>> {
    let root = service.create_node(NewNode::new("root", 1.0))?;
    let us = service.create_node(
        NewNode::new("us", 0.3)
            .with_condition("region", "us")
            .with_parent(root.id()),
    )?;
    let eu = service.create_node(
        NewNode::new("eu", 0.7)
            .with_condition("region", "eu")
            .with_parent(root.id()),
    )?;

    Ok(SampleTree {
        root: root.id(),
        us: us.id(),
        eu: eu.id(),
    })
}

/// In-memory service with an injected cache, cache settings and seed
pub fn service_with(
    cache: Arc<dyn KeyValueCache>,
    cache_config: &CacheConfig,
    seed: u64,
) -> AdsetService {
    init_logging();
    let store = Arc::new(StoredNodeStore::in_memory().expect("in-memory store"));
    AdsetService::new(store, cache, cache_config, WeightedSampler::seeded(seed))
}
