// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Adset CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments first to get log level
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // Default to Warn (can still be overridden by RUST_LOG env var)
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Commands::Version = cli.command {
        println!("{} {}", "adset".bold().green(), adset::VERSION);
        println!("Weighted decision-tree path generation");
        return Ok(());
    }

    let service = cli::open_service(&cli.options)?;
    let format = cli.options.format;

    let result = match cli.command {
        Commands::Create {
            name,
            probability,
            conditions,
            parent,
        } => cli::handle_create(&service, name, probability, conditions, parent, format),
        Commands::List => cli::handle_list(&service, format),
        Commands::Get { id } => cli::handle_get(&service, &id, format),
        Commands::Root => cli::handle_root(&service, format),
        Commands::Update {
            id,
            name,
            probability,
            conditions,
            clear_conditions,
        } => cli::handle_update(
            &service,
            &id,
            name,
            probability,
            conditions,
            clear_conditions,
            format,
        ),
        Commands::Delete { id } => cli::handle_delete(&service, &id, format),
        Commands::Generate {
            start,
            filters,
            count,
            fresh,
        } => cli::handle_generate(&service, start, filters, count, fresh, format),
        Commands::Tree => cli::handle_tree(&service, format),
        Commands::Version => Ok(()),
    };

    let result = cli::finish(result, service.flush());
    if let Err(e) = &result {
        eprintln!("{}", format!("Error: {}", e).red());
    }
    result
}
