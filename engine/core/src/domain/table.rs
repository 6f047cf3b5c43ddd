// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Table options for vector store and chat history provisioning.
//!
//! Identifiers are interpolated into DDL as double-quoted identifiers and are
//! otherwise not validated; callers must pass trusted names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_CONTENT_COLUMN: &str = "content";
pub const DEFAULT_EMBEDDING_COLUMN: &str = "embedding";
pub const DEFAULT_METADATA_JSON_COLUMN: &str = "langchain_metadata";
pub const DEFAULT_ID_COLUMN: &str = "langchain_id";
pub const DEFAULT_ID_TYPE: &str = "UUID";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableOptionsError {
    #[error("missing table name in options")]
    MissingTableName,

    #[error("missing vector size in options")]
    MissingVectorSize,
}

/// A typed column declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
        }
    }

    /// Fill in `langchain_id UUID` for whatever the id column leaves empty.
    pub fn or_default_id(mut self) -> Self {
        if self.name.is_empty() {
            self.name = DEFAULT_ID_COLUMN.to_string();
        }
        if self.data_type.is_empty() {
            self.data_type = DEFAULT_ID_TYPE.to_string();
        }
        self
    }
}

/// Layout of a vector store table. Empty names fall back to their defaults
/// in [`VectorstoreTableOptions::resolved`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorstoreTableOptions {
    pub table_name: String,
    pub vector_size: usize,
    pub schema_name: String,
    pub content_column_name: String,
    pub embedding_column: String,
    pub metadata_json_column: String,
}

impl VectorstoreTableOptions {
    pub fn new(table_name: impl Into<String>, vector_size: usize) -> Self {
        Self {
            table_name: table_name.into(),
            vector_size,
            ..Self::default()
        }
    }

    pub fn schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = schema_name.into();
        self
    }

    pub fn content_column_name(mut self, column: impl Into<String>) -> Self {
        self.content_column_name = column.into();
        self
    }

    pub fn embedding_column(mut self, column: impl Into<String>) -> Self {
        self.embedding_column = column.into();
        self
    }

    pub fn metadata_json_column(mut self, column: impl Into<String>) -> Self {
        self.metadata_json_column = column.into();
        self
    }

    /// Validate required fields and substitute defaults for empty names.
    pub fn resolved(&self) -> Result<Self, TableOptionsError> {
        if self.table_name.is_empty() {
            return Err(TableOptionsError::MissingTableName);
        }
        if self.vector_size == 0 {
            return Err(TableOptionsError::MissingVectorSize);
        }

        Ok(Self {
            table_name: self.table_name.clone(),
            vector_size: self.vector_size,
            schema_name: or_default(&self.schema_name, DEFAULT_SCHEMA),
            content_column_name: or_default(&self.content_column_name, DEFAULT_CONTENT_COLUMN),
            embedding_column: or_default(&self.embedding_column, DEFAULT_EMBEDDING_COLUMN),
            metadata_json_column: or_default(&self.metadata_json_column, DEFAULT_METADATA_JSON_COLUMN),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatHistoryTableOptions {
    pub table_name: String,
    pub schema_name: String,
}

impl ChatHistoryTableOptions {
    pub fn new(table_name: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            schema_name: schema_name.into(),
        }
    }

    pub fn resolved(&self) -> Result<Self, TableOptionsError> {
        if self.table_name.is_empty() {
            return Err(TableOptionsError::MissingTableName);
        }
        Ok(Self {
            table_name: self.table_name.clone(),
            schema_name: or_default(&self.schema_name, DEFAULT_SCHEMA),
        })
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() { default } else { value }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_names_resolve_to_defaults() {
        let resolved = VectorstoreTableOptions::new("docs", 128).resolved().unwrap();
        assert_eq!(resolved.schema_name, "public");
        assert_eq!(resolved.content_column_name, "content");
        assert_eq!(resolved.embedding_column, "embedding");
        assert_eq!(resolved.metadata_json_column, "langchain_metadata");
        assert_eq!(resolved.vector_size, 128);
    }

    #[test]
    fn explicit_names_are_kept() {
        let resolved = VectorstoreTableOptions::new("docs", 3)
            .schema_name("store")
            .content_column_name("body")
            .embedding_column("vec")
            .metadata_json_column("extra")
            .resolved()
            .unwrap();
        assert_eq!(resolved.schema_name, "store");
        assert_eq!(resolved.content_column_name, "body");
        assert_eq!(resolved.embedding_column, "vec");
        assert_eq!(resolved.metadata_json_column, "extra");
    }

    #[test]
    fn required_fields_are_checked_before_defaults() {
        assert_eq!(
            VectorstoreTableOptions::new("", 128).resolved(),
            Err(TableOptionsError::MissingTableName)
        );
        assert_eq!(
            VectorstoreTableOptions::new("docs", 0).resolved(),
            Err(TableOptionsError::MissingVectorSize)
        );
        assert_eq!(
            ChatHistoryTableOptions::new("", "public").resolved(),
            Err(TableOptionsError::MissingTableName)
        );
    }

    #[test]
    fn id_column_defaults() {
        assert_eq!(Column::default().or_default_id(), Column::new("langchain_id", "UUID", false));
        assert_eq!(
            Column::new("doc_id", "", false).or_default_id(),
            Column::new("doc_id", "UUID", false)
        );
        assert_eq!(
            Column::new("", "BIGINT", false).or_default_id(),
            Column::new("langchain_id", "BIGINT", false)
        );
    }

    #[test]
    fn chat_history_schema_defaults_to_public() {
        let resolved = ChatHistoryTableOptions::new("messages", "").resolved().unwrap();
        assert_eq!(resolved.schema_name, "public");
    }
}
