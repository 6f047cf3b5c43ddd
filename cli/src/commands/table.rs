// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Table provisioning commands
//!
//! Commands: init-vectorstore, init-chat-history

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use thiserror::Error;

use alloydb_engine_core::{Column, VectorstoreTableOptions};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColumnSpecError {
    #[error("column name cannot be empty")]
    EmptyName,

    #[error("expected NAME:TYPE[:nullable], got {0:?}")]
    MissingType(String),

    #[error("unknown column flag {0:?} (expected \"nullable\")")]
    UnknownFlag(String),
}

#[derive(Debug, Args)]
pub struct InitVectorstoreCommand {
    /// Table name
    #[arg(long)]
    pub table: String,

    /// Embedding dimension
    #[arg(long)]
    pub vector_size: usize,

    /// Schema (default: public)
    #[arg(long)]
    pub schema: Option<String>,

    /// Content column name (default: content)
    #[arg(long)]
    pub content_column: Option<String>,

    /// Embedding column name (default: embedding)
    #[arg(long)]
    pub embedding_column: Option<String>,

    /// JSON metadata column name (default: langchain_metadata)
    #[arg(long)]
    pub metadata_json_column: Option<String>,

    /// Extra metadata column, repeatable
    #[arg(long = "metadata-column", value_name = "NAME:TYPE[:nullable]", value_parser = parse_metadata_column)]
    pub metadata_columns: Vec<Column>,

    /// Primary key column (default: langchain_id:UUID)
    #[arg(long, value_name = "NAME[:TYPE]", value_parser = parse_id_column)]
    pub id_column: Option<Column>,

    /// Drop an existing table first
    #[arg(long)]
    pub overwrite: bool,

    /// Add a JSON column for metadata without a dedicated column
    #[arg(long)]
    pub store_metadata: bool,
}

impl InitVectorstoreCommand {
    fn options(&self) -> VectorstoreTableOptions {
        let mut options = VectorstoreTableOptions::new(&self.table, self.vector_size);
        if let Some(schema) = &self.schema {
            options = options.schema_name(schema);
        }
        if let Some(column) = &self.content_column {
            options = options.content_column_name(column);
        }
        if let Some(column) = &self.embedding_column {
            options = options.embedding_column(column);
        }
        if let Some(column) = &self.metadata_json_column {
            options = options.metadata_json_column(column);
        }
        options
    }
}

#[derive(Debug, Args)]
pub struct InitChatHistoryCommand {
    /// Table name
    #[arg(long)]
    pub table: String,

    /// Schema (default: public)
    #[arg(long, default_value = "")]
    pub schema: String,
}

/// Parse `NAME:TYPE` or `NAME:TYPE:nullable`.
pub fn parse_metadata_column(spec: &str) -> Result<Column, ColumnSpecError> {
    let mut parts = spec.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(ColumnSpecError::EmptyName);
    }

    let data_type = match parts.next().map(str::trim) {
        Some(data_type) if !data_type.is_empty() => data_type,
        _ => return Err(ColumnSpecError::MissingType(spec.to_string())),
    };

    let nullable = match parts.next().map(str::trim) {
        None => false,
        Some(flag) if flag.eq_ignore_ascii_case("nullable") || flag.eq_ignore_ascii_case("null") => true,
        Some(flag) => return Err(ColumnSpecError::UnknownFlag(flag.to_string())),
    };

    Ok(Column::new(name, data_type, nullable))
}

/// Parse `NAME` or `NAME:TYPE`. A missing type falls back to the default id type.
pub fn parse_id_column(spec: &str) -> Result<Column, ColumnSpecError> {
    let (name, data_type) = match spec.split_once(':') {
        Some((name, data_type)) => (name.trim(), data_type.trim()),
        None => (spec.trim(), ""),
    };
    if name.is_empty() {
        return Err(ColumnSpecError::EmptyName);
    }
    Ok(Column::new(name, data_type, false))
}

pub async fn init_vectorstore(
    command: InitVectorstoreCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    let options = command.options();
    let id_column = command.id_column.clone().unwrap_or_default();

    let mut engine = super::open_engine(config_override).await?;
    let result = engine
        .init_vectorstore_table(
            &options,
            &command.metadata_columns,
            id_column,
            command.overwrite,
            command.store_metadata,
        )
        .await;
    engine.close();
    result?;

    println!(
        "{}",
        format!(
            "✓ Vector store table created: {} (vector size {})",
            command.table, command.vector_size
        )
        .green()
    );
    Ok(())
}

pub async fn init_chat_history(
    command: InitChatHistoryCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    let mut engine = super::open_engine(config_override).await?;
    let result = engine
        .init_chat_history_table(&command.table, &command.schema)
        .await;
    engine.close();
    result?;

    println!(
        "{}",
        format!("✓ Chat history table ready: {}", command.table).green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_column_defaults_to_not_null() {
        let column = parse_metadata_column("area:int").unwrap();
        assert_eq!(column, Column::new("area", "int", false));
    }

    #[test]
    fn metadata_column_accepts_nullable_flag() {
        let column = parse_metadata_column("population:int:nullable").unwrap();
        assert!(column.nullable);
        assert_eq!(column.data_type, "int");
    }

    #[test]
    fn metadata_column_keeps_multi_word_types() {
        let column = parse_metadata_column("score:double precision").unwrap();
        assert_eq!(column.data_type, "double precision");
    }

    #[test]
    fn metadata_column_rejects_bad_specs() {
        assert_eq!(parse_metadata_column(":int"), Err(ColumnSpecError::EmptyName));
        assert_eq!(
            parse_metadata_column("area"),
            Err(ColumnSpecError::MissingType("area".into()))
        );
        assert_eq!(
            parse_metadata_column("area:int:maybe"),
            Err(ColumnSpecError::UnknownFlag("maybe".into()))
        );
    }

    #[test]
    fn id_column_type_is_optional() {
        let column = parse_id_column("doc_id").unwrap();
        assert_eq!(column.name, "doc_id");
        assert_eq!(column.or_default_id().data_type, "UUID");

        let column = parse_id_column("doc_id:BIGINT").unwrap();
        assert_eq!(column.data_type, "BIGINT");
        assert!(!column.nullable);
    }

    #[test]
    fn unset_flags_leave_library_defaults() {
        let command = InitVectorstoreCommand {
            table: "documents".into(),
            vector_size: 768,
            schema: None,
            content_column: Some("body".into()),
            embedding_column: None,
            metadata_json_column: None,
            metadata_columns: vec![],
            id_column: None,
            overwrite: false,
            store_metadata: false,
        };
        let options = command.options().resolved().unwrap();
        assert_eq!(options.schema_name, "public");
        assert_eq!(options.content_column_name, "body");
        assert_eq!(options.embedding_column, "embedding");
    }
}
