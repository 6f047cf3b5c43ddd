// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Settings management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use alloydb_engine_core::domain::settings::{CONFIG_FILE_NAME, CONFIG_PATH_ENV};
use alloydb_engine_core::EngineSettings;

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
const EXAMPLES_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show effective settings (file, then environment overrides)
    Show {
        /// Show settings file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate settings file
    Validate {
        /// Path to settings file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample settings file
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./alloydb-engine.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

fn or_unset(value: Option<&str>) -> String {
    value.map(str::to_string).unwrap_or_else(|| "(not set)".dimmed().to_string())
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let settings = EngineSettings::load_or_default(config_override.clone())
        .context("Failed to load settings")?;

    if show_paths {
        println!("{}", "Settings discovery paths:".bold());
        println!(
            "  1. --config flag: {}",
            or_unset(config_override.as_ref().and_then(|p| p.to_str()))
        );
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            or_unset(std::env::var(CONFIG_PATH_ENV).ok().as_deref())
        );
        println!("  3. ./{}", CONFIG_FILE_NAME);
        println!("  4. ~/.alloydb-engine/config.yaml");
        println!("  5. /etc/alloydb-engine/config.yaml");
        println!();
    }

    println!("{}", "Instance:".bold());
    println!("  Project: {}", settings.instance.project_id);
    println!("  Region: {}", settings.instance.region);
    println!("  Cluster: {}", settings.instance.cluster);
    println!("  Instance: {}", settings.instance.instance);
    println!("  IP type: {}", settings.ip_type);
    println!();

    println!("{}", "Identity:".bold());
    println!("  Database: {}", settings.database);
    println!("  User: {}", or_unset(settings.user.as_deref()));
    println!(
        "  Password: {}",
        if settings.password.is_some() {
            "********".to_string()
        } else {
            or_unset(None)
        }
    );
    println!(
        "  IAM account email: {}",
        or_unset(settings.iam_account_email.as_deref())
    );
    println!();

    println!("{}", "Proxy:".bold());
    match &settings.proxy {
        Some(proxy) => {
            println!("  Public: {}", proxy.public_addr);
            println!("  Private: {}", or_unset(proxy.private_addr.as_deref()));
        }
        None => println!("  {}", "(not configured)".dimmed()),
    }
    println!();

    println!("{}", "Pool:".bold());
    println!("  Max size: {}", settings.pool.max_size);
    println!("  Wait timeout: {}s", settings.pool.wait_timeout_secs);
    println!("  Create timeout: {}s", settings.pool.create_timeout_secs);
    println!("  Recycle timeout: {}s", settings.pool.recycle_timeout_secs);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating settings...");

    let settings = EngineSettings::load_or_default(config_path)
        .context("Failed to load settings")?;

    settings
        .validate()
        .context("Settings validation failed")?;

    println!("{}", "✓ Settings are valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        EXAMPLES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write settings to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Settings generated: {}", output.display()).green()
    );

    Ok(())
}
