// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line arguments

use adset::{CacheBackend, StorageType};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "adset", version, about = "Weighted decision-tree path generation")]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Database directory (overrides config and ADSET_DATA_PATH)
    #[arg(short, long, global = true)]
    pub path: Option<PathBuf>,

    /// Storage driver: sled or memory
    #[arg(long, global = true)]
    pub storage: Option<StorageType>,

    /// Cache backend: memory or storage
    #[arg(long, global = true)]
    pub cache: Option<CacheBackend>,

    /// JSON configuration file
    #[arg(short, long, global = true, env = "ADSET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a node (the root when --parent is omitted)
    Create {
        #[arg(short, long)]
        name: String,

        /// Relative weight among siblings, within [0, 1]
        #[arg(short = 'w', long)]
        probability: f64,

        /// Condition as key=value; repeatable
        #[arg(long = "condition", value_parser = parse_key_value)]
        conditions: Vec<(String, String)>,

        #[arg(long)]
        parent: Option<String>,
    },

    /// List every node
    List,

    /// Show a node and its children
    Get { id: String },

    /// Show the root node and its children
    Root,

    /// Change a node's name, weight or conditions
    Update {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short = 'w', long)]
        probability: Option<f64>,

        /// Replacement condition as key=value; repeatable
        #[arg(long = "condition", value_parser = parse_key_value)]
        conditions: Vec<(String, String)>,

        /// Remove every condition
        #[arg(long, conflicts_with = "conditions")]
        clear_conditions: bool,
    },

    /// Delete a node with its subtree
    Delete { id: String },

    /// Generate adsets
    Generate {
        /// Start node (defaults to the root)
        #[arg(long)]
        start: Option<String>,

        /// Filter entry as key=value; repeatable
        #[arg(long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,

        /// Number of adsets to draw
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Drop cached adsets before each draw
        #[arg(long)]
        fresh: bool,
    },

    /// Render the whole tree from the root
    Tree,

    /// Show version information
    Version,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}
