// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Connectivity check

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

pub async fn ping(config_override: Option<PathBuf>) -> Result<()> {
    let mut engine = super::open_engine(config_override).await?;

    let started = Instant::now();
    let result = engine.ping().await;
    engine.close();
    result?;

    let elapsed = started.elapsed();
    info!(elapsed_ms = elapsed.as_millis() as u64, "ping succeeded");
    println!(
        "{}",
        format!("✓ Database reachable ({} ms)", elapsed.as_millis()).green()
    );
    Ok(())
}
