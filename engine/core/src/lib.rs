// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # AlloyDB Engine Core
//!
//! Resolves how to authenticate against an AlloyDB instance (built-in
//! credentials or IAM identity), builds a connection pool whose every
//! connection is dialed through a secure tunnel, and provisions the tables
//! used by vector stores and chat message history.
//!
//! # Architecture
//!
//! - **Domain:** connection settings, identity resolution, table options,
//!   the secure-tunnel port
//! - **Application:** [`EngineConfig`] and [`PostgresEngine`], the owner of
//!   the pool
//! - **Infrastructure:** pool factory, DDL builder, identity provider and
//!   dialer adapters
//!
//! ```no_run
//! use alloydb_engine_core::{EngineConfig, PostgresEngine, VectorstoreTableOptions};
//!
//! # async fn run(dialer: std::sync::Arc<dyn alloydb_engine_core::Dialer>) -> anyhow::Result<()> {
//! let config = EngineConfig::builder()
//!     .user("postgres")
//!     .password("secret")
//!     .database("vectors")
//!     .instance("my-project", "us-central1", "my-cluster", "my-primary")
//!     .dialer(dialer)
//!     .build();
//!
//! let mut engine = PostgresEngine::new(config).await?;
//! engine
//!     .init_vectorstore_table(
//!         &VectorstoreTableOptions::new("documents", 768),
//!         &[],
//!         Default::default(),
//!         false,
//!         true,
//!     )
//!     .await?;
//! engine.close();
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::config::{EngineConfig, EngineConfigBuilder};
pub use application::engine::{EngineError, PostgresEngine};
pub use domain::config::{ConnectionSettings, InstanceCoordinates, IpType, PoolSettings};
pub use domain::dialer::{DialTarget, Dialer, InstanceUri, TunnelStream};
pub use domain::identity::{resolve_identity, Credentials, EmailRetriever, IdentityError, ResolvedIdentity};
pub use domain::settings::{EngineSettings, ProxySettings};
pub use domain::table::{ChatHistoryTableOptions, Column, TableOptionsError, VectorstoreTableOptions};
pub use infrastructure::pool::{ConnectError, ConnectionError, Pool, TunnelConnection, TunnelManager};
