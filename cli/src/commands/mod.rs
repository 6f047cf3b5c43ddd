// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the AlloyDB engine CLI

pub mod config;
pub mod database;
pub mod table;

pub use self::config::ConfigCommand;
pub use self::table::{InitChatHistoryCommand, InitVectorstoreCommand};

use anyhow::{Context, Result};
use std::path::PathBuf;

use alloydb_engine_core::{EngineConfigBuilder, EngineSettings, PostgresEngine};

/// Load settings and open an engine. The pool is lazy; nothing is dialed yet.
pub(crate) async fn open_engine(config_override: Option<PathBuf>) -> Result<PostgresEngine> {
    let settings =
        EngineSettings::load_or_default(config_override).context("Failed to load settings")?;
    settings.validate().context("Settings validation failed")?;

    let engine = PostgresEngine::new(EngineConfigBuilder::from_settings(&settings).build())
        .await
        .context("Failed to create engine")?;
    Ok(engine)
}
