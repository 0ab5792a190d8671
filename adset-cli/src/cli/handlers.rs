// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for adset

use colored::Colorize;
use std::collections::{BTreeMap, HashSet};

use super::commands::{GlobalOptions, OutputFormat};
use super::output::NodeFormatter;
use adset::{
    AdsetConfig, AdsetFilter, AdsetResult, AdsetService, NewNode, Node, NodeId, NodePatch,
    StoreError,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the service described by the config file, the `ADSET_*` variables
/// and the command-line overrides, in that order of precedence.
pub fn open_service(options: &GlobalOptions) -> Result<AdsetService, Box<dyn std::error::Error>> {
    let mut config = AdsetConfig::load(options.config.as_deref())?;

    if let Some(path) = &options.path {
        config.data_path = path.clone();
    }
    if let Some(storage) = options.storage {
        config.storage_type = storage;
    }
    if let Some(backend) = options.cache {
        config.cache.backend = backend;
    }
    config.validate()?;

    log::debug!("Effective configuration: {:?}", config);
    Ok(AdsetService::from_config(&config)?)
}

pub fn handle_create(
    service: &AdsetService,
    name: String,
    probability: f64,
    conditions: Vec<(String, String)>,
    parent: Option<String>,
    format: OutputFormat,
) -> CliResult {
    let mut new_node = NewNode::new(name, probability);
    for (key, value) in conditions {
        new_node = new_node.with_condition(key, value);
    }
    if let Some(parent) = parent {
        new_node = new_node.with_parent(parent.parse()?);
    }

    let node = service.create_node(new_node)?;
    if format == OutputFormat::Table {
        println!("{}", format!("Created node {}", node.id()).green());
    }
    println!("{}", NodeFormatter::format_populated(&node, format));
    Ok(())
}

pub fn handle_list(service: &AdsetService, format: OutputFormat) -> CliResult {
    let nodes = service.list_nodes()?;
    println!("{}", NodeFormatter::format_nodes(&nodes, format));
    Ok(())
}

pub fn handle_get(service: &AdsetService, id: &str, format: OutputFormat) -> CliResult {
    let node = service.get_node(id.parse()?)?;
    println!("{}", NodeFormatter::format_populated(&node, format));
    Ok(())
}

pub fn handle_root(service: &AdsetService, format: OutputFormat) -> CliResult {
    let root = service.get_root()?;
    println!("{}", NodeFormatter::format_populated(&root, format));
    Ok(())
}

pub fn handle_update(
    service: &AdsetService,
    id: &str,
    name: Option<String>,
    probability: Option<f64>,
    conditions: Vec<(String, String)>,
    clear_conditions: bool,
    format: OutputFormat,
) -> CliResult {
    let conditions = if clear_conditions {
        Some(BTreeMap::new())
    } else if conditions.is_empty() {
        None
    } else {
        Some(conditions.into_iter().collect())
    };
    let patch = NodePatch {
        name,
        conditions,
        probability,
    };
    if patch.is_empty() {
        return Err("nothing to update: pass --name, --probability or --condition".into());
    }

    let node = service.update_node(id.parse()?, patch)?;
    if format == OutputFormat::Table {
        println!("{}", format!("Updated node {}", node.id).green());
    }
    println!("{}", NodeFormatter::format_nodes(std::slice::from_ref(&node), format));
    Ok(())
}

pub fn handle_delete(service: &AdsetService, id: &str, format: OutputFormat) -> CliResult {
    let id: NodeId = id.parse()?;
    let removed = service.delete_node(id)?;
    match format {
        OutputFormat::Table => println!(
            "{}",
            format!("Deleted node {} ({} nodes removed)", id, removed).green()
        ),
        OutputFormat::Json => println!(
            "{}",
            NodeFormatter::to_json(&serde_json::json!({ "deleted": id, "removed": removed }))
        ),
    }
    Ok(())
}

pub fn handle_generate(
    service: &AdsetService,
    start: Option<String>,
    filters: Vec<(String, String)>,
    count: usize,
    fresh: bool,
    format: OutputFormat,
) -> CliResult {
    let start = start.map(|id| id.parse::<NodeId>()).transpose()?;
    let filter: AdsetFilter = filters.into_iter().collect();

    let mut adsets = Vec::with_capacity(count);
    for _ in 0..count.max(1) {
        if fresh {
            service.clear_result_cache();
        }
        adsets.push(service.generate_adset(&filter, start)?);
    }

    println!("{}", NodeFormatter::format_adsets(&adsets, &filter, format));
    log::debug!("Result cache: {:?}", service.stats().result_cache);
    Ok(())
}

pub fn handle_tree(service: &AdsetService, format: OutputFormat) -> CliResult {
    let rows = tree_rows(service)?;
    println!("{}", NodeFormatter::format_tree(&rows, format));
    Ok(())
}

/// Depth-first `(depth, node)` rows from the root, in display order
pub fn tree_rows(service: &AdsetService) -> AdsetResult<Vec<(usize, Node)>> {
    let root = service.get_root()?;

    let mut rows = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![(0usize, root.node)];
    while let Some((depth, node)) = stack.pop() {
        if !visited.insert(node.id) {
            return Err(StoreError::Corrupt(format!("node {} is reachable twice", node.id)).into());
        }
        let populated = service.get_node(node.id)?;
        for child in populated.children.into_iter().rev() {
            stack.push((depth + 1, child));
        }
        rows.push((depth, node));
    }
    Ok(rows)
}

/// Combine the command outcome with the final flush; the command's own error wins
pub fn finish(result: CliResult, flushed: AdsetResult<()>) -> CliResult {
    match (result, flushed) {
        (Err(e), Err(flush_error)) => {
            log::warn!("Flush after a failed command also failed: {}", flush_error);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), Err(flush_error)) => Err(flush_error.into()),
        (Ok(()), Ok(())) => Ok(()),
    }
}
