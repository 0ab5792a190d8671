//! Key-value cache that is always unavailable

use adset::cache::{CacheError, CacheResult, KeyValueCache};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct FailingCache {
    calls: AtomicU64,
}

impl FailingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls the service attempted
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn fail<T>(&self) -> CacheResult<T> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

impl KeyValueCache for FailingCache {
    fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.fail()
    }

    fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        self.fail()
    }

    fn delete(&self, _key: &str) -> CacheResult<()> {
        self.fail()
    }

    fn scan_prefix(&self, _prefix: &str) -> CacheResult<Vec<String>> {
        self.fail()
    }
}
