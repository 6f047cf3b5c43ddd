// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgresEngine
//!
//! Long-lived owner of the connection pool. Creation runs identity
//! resolution and then the pool factory; afterwards the engine hands out
//! the pool to downstream vector store and chat history code and
//! provisions their tables on demand.
//!
//! No stage is retried. A failure aborts the call and is returned with the
//! name of the stage that failed. If table creation fails after the vector
//! extension was created, the extension stays (it is idempotent) and the
//! table is not considered created.

use thiserror::Error;
use tracing::{debug, info};

use crate::application::config::EngineConfig;
use crate::domain::identity::{resolve_identity, IdentityError};
use crate::domain::table::{ChatHistoryTableOptions, Column, TableOptionsError, VectorstoreTableOptions};
use crate::infrastructure::ddl;
use crate::infrastructure::google_identity;
use crate::infrastructure::pool::{self, ConnectError, ConnectionError, Pool, PooledConnection};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid table options: {0}")]
    Config(#[from] TableOptionsError),

    #[error("error assigning user: {0}")]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("unable to acquire connection: {0}")]
    Checkout(#[from] deadpool::managed::PoolError<ConnectError>),

    #[error("{stage}: {source}")]
    Schema {
        stage: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("engine is closed")]
    Closed,
}

pub struct PostgresEngine {
    pool: Option<Pool>,
}

impl PostgresEngine {
    /// Resolve the identity, then adopt the supplied pool or build one.
    ///
    /// Without a configured email retriever the ambient principal is looked
    /// up through the metadata server.
    pub async fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let EngineConfig {
            credentials,
            connection,
            pool,
            email_retriever,
            dialer,
        } = config;

        let retriever = email_retriever.unwrap_or_else(google_identity::default_email_retriever);
        let identity = resolve_identity(&credentials, &*retriever).await?;

        let pool = match pool {
            Some(pool) => {
                debug!("using supplied connection pool");
                pool
            }
            None => pool::create_pool(&connection, &identity, &credentials.password, dialer)?,
        };

        Ok(Self { pool: Some(pool) })
    }

    /// Wrap an existing pool without resolving any identity.
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool: Some(pool) }
    }

    pub fn pool(&self) -> Option<&Pool> {
        self.pool.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_none()
    }

    /// Release the pool. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close();
            info!("connection pool closed");
        }
    }

    async fn connection(&self) -> Result<PooledConnection, EngineError> {
        let pool = self.pool.as_ref().ok_or(EngineError::Closed)?;
        Ok(pool.get().await?)
    }

    async fn execute(conn: &PooledConnection, stage: &'static str, sql: &str) -> Result<(), EngineError> {
        debug!(%stage, %sql, "executing statement");
        conn.batch_execute(sql)
            .await
            .map_err(|source| EngineError::Schema { stage, source })
    }

    /// Round-trip `SELECT 1` over a pooled connection.
    pub async fn ping(&self) -> Result<(), EngineError> {
        let conn = self.connection().await?;
        Self::execute(&conn, "failed to ping database", "SELECT 1").await
    }

    /// Create a table for storing documents and their embeddings.
    ///
    /// The `vector` extension is created first. With `overwrite_existing` an
    /// existing table is dropped; without it, an existing table makes the
    /// CREATE fail. With `store_metadata` a trailing JSON column holds
    /// metadata that has no dedicated column.
    pub async fn init_vectorstore_table(
        &self,
        options: &VectorstoreTableOptions,
        metadata_columns: &[Column],
        id_column: Column,
        overwrite_existing: bool,
        store_metadata: bool,
    ) -> Result<(), EngineError> {
        let options = options.resolved()?;
        let id_column = id_column.or_default_id();
        let conn = self.connection().await?;

        Self::execute(&conn, "failed to create extension", ddl::CREATE_VECTOR_EXTENSION).await?;

        if overwrite_existing {
            let drop = ddl::drop_table(&options.schema_name, &options.table_name);
            Self::execute(&conn, "failed to drop table", &drop).await?;
        }

        let create = ddl::create_vectorstore_table(&options, metadata_columns, &id_column, store_metadata);
        Self::execute(&conn, "failed to create table", &create).await?;

        info!(
            schema = %options.schema_name,
            table = %options.table_name,
            vector_size = options.vector_size,
            "vector store table created"
        );
        Ok(())
    }

    /// Create the chat message history table if it does not exist yet.
    pub async fn init_chat_history_table(&self, table_name: &str, schema_name: &str) -> Result<(), EngineError> {
        let options = ChatHistoryTableOptions::new(table_name, schema_name).resolved()?;
        let conn = self.connection().await?;

        let create = ddl::create_chat_history_table(&options);
        Self::execute(&conn, "failed to execute query", &create).await?;

        info!(schema = %options.schema_name, table = %options.table_name, "chat history table ready");
        Ok(())
    }
}
