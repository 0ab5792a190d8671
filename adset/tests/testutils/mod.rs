//! Test utilities for adset integration tests
//!
//! - TestFixture: an isolated service over a temporary sled database
//! - FailingCache: a key-value cache whose every call fails
//!
//! Fixtures route the crate's `log` output to the test harness; set
//! `RUST_LOG=adset=debug` to see it.

pub mod failing_cache;
pub mod test_fixture;

/// Install the test logger once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
