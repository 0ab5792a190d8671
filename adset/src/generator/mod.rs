// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Adset generation: filtered, weighted walk from a start node to a leaf

pub mod adset_generator;
pub mod sampler;

pub use adset_generator::AdsetGenerator;
pub use sampler::WeightedSampler;
