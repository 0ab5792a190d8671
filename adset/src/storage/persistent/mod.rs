// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Persistent key-value drivers
//!
//! Trait-based abstractions over raw key-value storage so the node store and
//! the driver-backed TTL cache can run on sled or in memory interchangeably.
//!
//! # Architecture
//!
//! ```text
//! StoredNodeStore / StoredKeyValueCache (records, expiry)
//!     ↓
//! StorageDriver / StorageTree (key-value abstraction)
//!     ↓
//! Concrete Implementations (Sled, Memory)
//! ```

pub mod factory;
pub mod traits;
pub mod types;

pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;

pub use factory::create_storage_driver;
pub use traits::{StorageDriver, StorageTree};
pub use types::{StorageDriverError, StorageResult, StorageType};
