// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Adset service - the single entry point wiring store, caches, mutator and
//! generator together

pub mod service;

pub use service::{AdsetService, ServiceStats};
