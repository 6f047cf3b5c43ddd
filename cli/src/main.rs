// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! AlloyDB engine CLI
//!
//! Checks connectivity to an AlloyDB instance and provisions the tables
//! used by vector store and chat history clients.
//!
//! # Usage
//!
//! ```bash
//! alloydb-engine ping
//! alloydb-engine init-vectorstore --table documents --vector-size 768
//! alloydb-engine init-chat-history --table messages
//! alloydb-engine config show --paths
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::debug;

use alloydb_engine::args::{Cli, Commands};
use alloydb_engine::commands;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is read before parsing so env-backed flags see it
    let dotenv = dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;
    if let Some(path) = dotenv {
        debug!("Loaded environment from {:?}", path);
    }

    match cli.command {
        Some(Commands::Ping) => commands::database::ping(cli.config).await,
        Some(Commands::InitVectorstore { command }) => {
            commands::table::init_vectorstore(command, cli.config).await
        }
        Some(Commands::InitChatHistory { command }) => {
            commands::table::init_chat_history(command, cli.config).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            println!("{}", "No command given. Run with --help for usage.".yellow());
            Ok(())
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
