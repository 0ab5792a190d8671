// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Structural mutations of the decision tree

pub mod mutator;

pub use mutator::TreeMutator;
