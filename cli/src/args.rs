// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Top-level argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{ConfigCommand, InitChatHistoryCommand, InitVectorstoreCommand};

/// AlloyDB engine - connection checks and table provisioning
#[derive(Debug, Parser)]
#[command(name = "alloydb-engine")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to settings file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "ALLOYDB_ENGINE_CONFIG",
        value_name = "FILE"
    )]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "ALLOYDB_ENGINE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open a pooled connection and run SELECT 1
    #[command(name = "ping")]
    Ping,

    /// Create a vector store table
    #[command(name = "init-vectorstore")]
    InitVectorstore {
        #[command(flatten)]
        command: InitVectorstoreCommand,
    },

    /// Create the chat message history table if missing
    #[command(name = "init-chat-history")]
    InitChatHistory {
        #[command(flatten)]
        command: InitChatHistoryCommand,
    },

    /// Settings file management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_vectorstore_invocation() {
        let cli = Cli::try_parse_from([
            "alloydb-engine",
            "--config",
            "engine.yaml",
            "init-vectorstore",
            "--table",
            "documents",
            "--vector-size",
            "768",
            "--metadata-column",
            "area:int",
            "--metadata-column",
            "population:int:nullable",
            "--id-column",
            "doc_id",
            "--overwrite",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("engine.yaml")));
        match cli.command {
            Some(Commands::InitVectorstore { command }) => {
                assert_eq!(command.table, "documents");
                assert_eq!(command.vector_size, 768);
                assert_eq!(command.metadata_columns.len(), 2);
                assert!(command.metadata_columns[1].nullable);
                assert!(command.overwrite);
                assert!(!command.store_metadata);
            }
            _ => panic!("expected init-vectorstore"),
        }
    }

    #[test]
    fn rejects_malformed_metadata_column() {
        let result = Cli::try_parse_from([
            "alloydb-engine",
            "init-vectorstore",
            "--table",
            "documents",
            "--vector-size",
            "768",
            "--metadata-column",
            "area",
        ]);
        assert!(result.is_err());
    }
}
