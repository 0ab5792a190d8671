// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node and adset formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;
use std::collections::BTreeMap;

use super::commands::OutputFormat;
use adset::{AdsetFilter, Conditions, Node, PopulatedNode};

/// Formatter for nodes, adsets and trees
pub struct NodeFormatter;

impl NodeFormatter {
    /// Pretty JSON, or an error document if serialization fails
    pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            format!(
                "{{\"status\": \"error\", \"error\": \"Could not serialize to JSON: {}\"}}",
                e
            )
        })
    }

    /// A node followed by its children
    pub fn format_populated(node: &PopulatedNode, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::to_json(node),
            OutputFormat::Table => {
                let mut output = Self::node_table(std::slice::from_ref(&node.node));
                output.push('\n');
                if node.children.is_empty() {
                    output.push_str(&format!("{}", "Leaf node (no children)".yellow()));
                } else {
                    output.push_str(&format!(
                        "{}\n",
                        format!("Children ({})", node.children.len()).bold()
                    ));
                    output.push_str(&Self::node_table(&node.children));
                }
                output
            }
        }
    }

    pub fn format_nodes(nodes: &[Node], format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::to_json(nodes),
            OutputFormat::Table if nodes.is_empty() => format!("{}", "No nodes found".yellow()),
            OutputFormat::Table => {
                let mut output = Self::node_table(nodes);
                output.push_str(&format!("\nNodes: {}", nodes.len()));
                output
            }
        }
    }

    /// One or more generated adsets; several draws also get a leaf tally
    pub fn format_adsets(adsets: &[Vec<Node>], filter: &AdsetFilter, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "filter": filter,
                    "adsets": adsets,
                });
                Self::to_json(&json)
            }
            OutputFormat::Table => {
                let mut output = String::new();
                output.push_str(&format!("{}\n", "Generated adsets".bold().green()));
                let shown = if filter.is_empty() {
                    "(none)".to_string()
                } else {
                    filter.normalized()
                };
                output.push_str(&format!("Filter: {}\n\n", shown));

                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec![
                    Cell::new("#").fg(Color::Green),
                    Cell::new("Path").fg(Color::Green),
                    Cell::new("Leaf id").fg(Color::Green),
                ]);
                for (i, adset) in adsets.iter().enumerate() {
                    let path = adset
                        .iter()
                        .map(|node| node.name.as_str())
                        .collect::<Vec<_>>()
                        .join(" → ");
                    let leaf = adset
                        .last()
                        .map(|node| node.id.to_string())
                        .unwrap_or_default();
                    table.add_row(vec![(i + 1).to_string(), path, leaf]);
                }
                output.push_str(&table.to_string());

                if adsets.len() > 1 {
                    output.push_str(&format!("\n\n{}\n", "Leaf frequency".bold()));
                    output.push_str(&Self::tally_table(adsets));
                }
                output
            }
        }
    }

    /// Rows of `(depth, node)` in display order
    pub fn format_tree(rows: &[(usize, Node)], format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => {
                let json: Vec<_> = rows
                    .iter()
                    .map(|(depth, node)| serde_json::json!({ "depth": depth, "node": node }))
                    .collect();
                Self::to_json(&json)
            }
            OutputFormat::Table => rows
                .iter()
                .map(|(depth, node)| {
                    let indent = "  ".repeat(*depth);
                    let marker = if *depth == 0 { "" } else { "└─ " };
                    format!(
                        "{}{}{} {} {}",
                        indent,
                        marker,
                        node.name.bold(),
                        format!("p={}", node.probability).cyan(),
                        Self::conditions_to_string(&node.conditions).dimmed()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    fn node_table(nodes: &[Node]) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            ["Id", "Name", "Probability", "Conditions", "Parent", "Children"]
                .iter()
                .map(|col| Cell::new(col).fg(Color::Green))
                .collect::<Vec<_>>(),
        );

        for node in nodes {
            table.add_row(vec![
                node.id.to_string(),
                node.name.clone(),
                node.probability.to_string(),
                Self::conditions_to_string(&node.conditions),
                node.parent
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                node.children.len().to_string(),
            ]);
        }
        table.to_string()
    }

    fn tally_table(adsets: &[Vec<Node>]) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for adset in adsets {
            if let Some(leaf) = adset.last() {
                *counts.entry(leaf.name.as_str()).or_default() += 1;
            }
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Leaf").fg(Color::Green),
            Cell::new("Count").fg(Color::Green),
            Cell::new("Share").fg(Color::Green),
        ]);
        for (name, count) in counts {
            table.add_row(vec![
                name.to_string(),
                count.to_string(),
                format!("{:.1}%", count as f64 * 100.0 / adsets.len() as f64),
            ]);
        }
        table.to_string()
    }

    fn conditions_to_string(conditions: &Conditions) -> String {
        if conditions.is_empty() {
            return "{}".to_string();
        }
        format!(
            "{{{}}}",
            conditions
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
