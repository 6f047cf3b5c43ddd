// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! DDL statement assembly. Pure string building, nothing is executed here.
//!
//! All builders expect options already passed through `resolved()`.

use crate::domain::table::{ChatHistoryTableOptions, Column, VectorstoreTableOptions};

pub const CREATE_VECTOR_EXTENSION: &str = "CREATE EXTENSION IF NOT EXISTS vector";

fn qualified(schema: &str, table: &str) -> String {
    format!(r#""{schema}"."{table}""#)
}

pub fn drop_table(schema: &str, table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", qualified(schema, table))
}

/// Column order: id, content, embedding, metadata columns in caller order,
/// then the optional JSON metadata column.
pub fn create_vectorstore_table(
    options: &VectorstoreTableOptions,
    metadata_columns: &[Column],
    id_column: &Column,
    store_metadata: bool,
) -> String {
    let mut columns = vec![
        format!(r#""{}" {} PRIMARY KEY"#, id_column.name, id_column.data_type),
        format!(r#""{}" TEXT NOT NULL"#, options.content_column_name),
        format!(r#""{}" vector({}) NOT NULL"#, options.embedding_column, options.vector_size),
    ];

    columns.extend(metadata_columns.iter().map(|column| {
        if column.nullable {
            format!(r#""{}" {}"#, column.name, column.data_type)
        } else {
            format!(r#""{}" {} NOT NULL"#, column.name, column.data_type)
        }
    }));

    if store_metadata {
        columns.push(format!(r#""{}" JSON"#, options.metadata_json_column));
    }

    format!(
        "CREATE TABLE {} (\n  {}\n);",
        qualified(&options.schema_name, &options.table_name),
        columns.join(",\n  ")
    )
}

pub fn create_chat_history_table(options: &ChatHistoryTableOptions) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  \
           id SERIAL PRIMARY KEY,\n  \
           session_id TEXT NOT NULL,\n  \
           data JSONB NOT NULL,\n  \
           type TEXT NOT NULL\n\
         );",
        qualified(&options.schema_name, &options.table_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> VectorstoreTableOptions {
        VectorstoreTableOptions::new("t", 128).resolved().unwrap()
    }

    #[test]
    fn minimal_vectorstore_table() {
        let sql = create_vectorstore_table(&options(), &[], &Column::default().or_default_id(), false);
        assert_eq!(
            sql,
            "CREATE TABLE \"public\".\"t\" (\n  \
             \"langchain_id\" UUID PRIMARY KEY,\n  \
             \"content\" TEXT NOT NULL,\n  \
             \"embedding\" vector(128) NOT NULL\n);"
        );
    }

    #[test]
    fn metadata_columns_keep_caller_order_and_nullability() {
        let metadata = [
            Column::new("population", "int", false),
            Column::new("area", "int", true),
            Column::new("country", "TEXT", false),
        ];
        let sql = create_vectorstore_table(&options(), &metadata, &Column::default().or_default_id(), true);

        let population = sql.find(r#""population" int NOT NULL"#).unwrap();
        let area = sql.find(r#""area" int,"#).unwrap();
        let country = sql.find(r#""country" TEXT NOT NULL"#).unwrap();
        let json = sql.find(r#""langchain_metadata" JSON"#).unwrap();
        let embedding = sql.find(r#""embedding" vector(128) NOT NULL"#).unwrap();

        assert!(embedding < population);
        assert!(population < area && area < country && country < json);
        assert!(sql.ends_with("\"langchain_metadata\" JSON\n);"));
    }

    #[test]
    fn json_column_only_when_requested() {
        let id = Column::default().or_default_id();
        assert!(!create_vectorstore_table(&options(), &[], &id, false).contains("JSON"));
        assert!(create_vectorstore_table(&options(), &[], &id, true).contains(r#""langchain_metadata" JSON"#));
    }

    #[test]
    fn custom_names_are_quoted() {
        let options = VectorstoreTableOptions::new("docs", 3)
            .schema_name("store")
            .content_column_name("body")
            .embedding_column("vec")
            .resolved()
            .unwrap();
        let sql = create_vectorstore_table(&options, &[], &Column::new("doc_id", "BIGINT", false), false);

        assert!(sql.starts_with(r#"CREATE TABLE "store"."docs" ("#));
        assert!(sql.contains(r#""doc_id" BIGINT PRIMARY KEY"#));
        assert!(sql.contains(r#""body" TEXT NOT NULL"#));
        assert!(sql.contains(r#""vec" vector(3) NOT NULL"#));
    }

    #[test]
    fn drop_statement() {
        assert_eq!(drop_table("public", "t"), r#"DROP TABLE IF EXISTS "public"."t""#);
    }

    #[test]
    fn chat_history_statement() {
        let options = ChatHistoryTableOptions::new("messages", "").resolved().unwrap();
        assert_eq!(
            create_chat_history_table(&options),
            "CREATE TABLE IF NOT EXISTS \"public\".\"messages\" (\n  \
             id SERIAL PRIMARY KEY,\n  \
             session_id TEXT NOT NULL,\n  \
             data JSONB NOT NULL,\n  \
             type TEXT NOT NULL\n);"
        );
    }
}
