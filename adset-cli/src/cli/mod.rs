// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for adset
//!
//! One subcommand per service operation, run against a local database.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{
    finish, handle_create, handle_delete, handle_generate, handle_get, handle_list, handle_root,
    handle_tree, handle_update, open_service,
};
