// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Tunnelled Connection Pool
//!
//! Builds the `deadpool` pool the engine owns. The pool's manager has exactly
//! one way to open a connection: dial the instance through the configured
//! [`Dialer`] and run the Postgres handshake over that stream with
//! `connect_raw`. No connection can bypass the secure tunnel.
//!
//! With IAM authentication the connection descriptor carries no password at
//! all; the tunnel authenticates the session with a token instead.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use deadpool::managed::{self, BuildError, Metrics, RecycleError, RecycleResult};
use deadpool::Runtime;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info, warn};

use crate::domain::config::ConnectionSettings;
use crate::domain::dialer::{DialTarget, Dialer, InstanceUri};
use crate::domain::identity::ResolvedIdentity;

pub type Pool = managed::Pool<TunnelManager>;
pub type PooledConnection = managed::Object<TunnelManager>;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to initialize connection: {0}")]
    DialerInit(String),

    #[error("failed to parse connection config: {0}")]
    ParseConfig(#[source] tokio_postgres::Error),

    #[error("unable to create connection pool: {0}")]
    PoolBuild(#[source] BuildError),
}

/// Failure opening or reusing a single pooled connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to dial instance through secure tunnel: {0}")]
    Dial(#[source] std::io::Error),

    #[error("postgres handshake failed: {0}")]
    Handshake(#[source] tokio_postgres::Error),

    #[error("connection closed by server")]
    Closed,
}

/// A client plus the task driving its connection.
pub struct TunnelConnection {
    client: Client,
    driver: JoinHandle<()>,
}

impl Deref for TunnelConnection {
    type Target = Client;

    fn deref(&self) -> &Client {
        &self.client
    }
}

impl DerefMut for TunnelConnection {
    fn deref_mut(&mut self) -> &mut Client {
        &mut self.client
    }
}

impl Drop for TunnelConnection {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

pub struct TunnelManager {
    pg_config: tokio_postgres::Config,
    dialer: Arc<dyn Dialer>,
    target: DialTarget,
}

impl TunnelManager {
    pub fn new(pg_config: tokio_postgres::Config, dialer: Arc<dyn Dialer>, target: DialTarget) -> Self {
        Self { pg_config, dialer, target }
    }

    pub fn target(&self) -> &DialTarget {
        &self.target
    }
}

impl managed::Manager for TunnelManager {
    type Type = TunnelConnection;
    type Error = ConnectError;

    async fn create(&self) -> Result<TunnelConnection, ConnectError> {
        debug!(
            instance = %self.target.instance_uri,
            ip_type = %self.target.ip_type,
            "dialing instance through secure tunnel"
        );
        let stream = self.dialer.dial(&self.target).await.map_err(ConnectError::Dial)?;

        let (client, connection) = self
            .pg_config
            .connect_raw(stream, NoTls)
            .await
            .map_err(ConnectError::Handshake)?;

        let instance = self.target.instance_uri.clone();
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(%instance, error = %e, "connection driver terminated");
            }
        });

        Ok(TunnelConnection { client, driver })
    }

    async fn recycle(&self, conn: &mut TunnelConnection, _: &Metrics) -> RecycleResult<ConnectError> {
        if conn.client.is_closed() {
            return Err(RecycleError::Backend(ConnectError::Closed));
        }
        Ok(())
    }
}

/// key=value connection descriptor. The password key is left out entirely
/// for IAM authentication.
pub fn connection_descriptor(identity: &ResolvedIdentity, password: &str, database: &str) -> String {
    if identity.iam_auth {
        format!(
            "user={} dbname={} sslmode=disable",
            quote_value(&identity.user),
            quote_value(database)
        )
    } else {
        format!(
            "user={} password={} dbname={} sslmode=disable",
            quote_value(&identity.user),
            quote_value(password),
            quote_value(database)
        )
    }
}

fn quote_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\' || c == '=');
    if !needs_quotes {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

/// Build a pool for `connection` authenticated as `identity`. `password` is
/// only used for built-in authentication.
///
/// The pool is lazy: no connection is opened until the first checkout.
pub fn create_pool(
    connection: &ConnectionSettings,
    identity: &ResolvedIdentity,
    password: &str,
    dialer: Option<Arc<dyn Dialer>>,
) -> Result<Pool, ConnectionError> {
    let dialer = dialer
        .ok_or_else(|| ConnectionError::DialerInit("no secure-tunnel dialer configured".to_string()))?;

    let pg_config: tokio_postgres::Config = connection_descriptor(identity, password, &connection.database)
        .parse()
        .map_err(ConnectionError::ParseConfig)?;

    let target = DialTarget {
        instance_uri: InstanceUri::from(&connection.instance),
        ip_type: connection.ip_type,
        iam_auth: identity.iam_auth,
    };

    info!(
        instance = %target.instance_uri,
        ip_type = %target.ip_type,
        iam_auth = target.iam_auth,
        user = %identity.user,
        "creating connection pool"
    );

    let settings = &connection.pool;
    managed::Pool::builder(TunnelManager::new(pg_config, dialer, target))
        .max_size(settings.max_size)
        .wait_timeout(Some(settings.wait_timeout()))
        .create_timeout(Some(settings.create_timeout()))
        .recycle_timeout(Some(settings.recycle_timeout()))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(ConnectionError::PoolBuild)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{InstanceCoordinates, IpType, PoolSettings};
    use crate::domain::dialer::TunnelStream;
    use async_trait::async_trait;
    use deadpool::managed::PoolError;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDialer {
        calls: AtomicUsize,
        targets: Mutex<Vec<DialTarget>>,
    }

    #[async_trait]
    impl Dialer for RecordingDialer {
        async fn dial(&self, target: &DialTarget) -> io::Result<TunnelStream> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.targets.lock().unwrap().push(target.clone());
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "tunnel unavailable"))
        }
    }

    fn built_in(user: &str) -> ResolvedIdentity {
        ResolvedIdentity { user: user.to_string(), iam_auth: false }
    }

    fn iam(user: &str) -> ResolvedIdentity {
        ResolvedIdentity { user: user.to_string(), iam_auth: true }
    }

    #[test]
    fn descriptor_with_password() {
        assert_eq!(
            connection_descriptor(&built_in("alice"), "pw", "db"),
            "user=alice password=pw dbname=db sslmode=disable"
        );
    }

    #[test]
    fn iam_descriptor_omits_password() {
        let descriptor = connection_descriptor(&iam("sa@project.iam"), "ignored", "db");
        assert_eq!(descriptor, "user=sa@project.iam dbname=db sslmode=disable");
        assert!(!descriptor.contains("password"));
    }

    #[test]
    fn descriptor_values_are_quoted_when_needed() {
        let descriptor = connection_descriptor(&built_in("alice"), "it's a secret", "db");
        let parsed: tokio_postgres::Config = descriptor.parse().unwrap();
        assert_eq!(parsed.get_password(), Some("it's a secret".as_bytes()));
        assert_eq!(parsed.get_user(), Some("alice"));
        assert_eq!(parsed.get_dbname(), Some("db"));
    }

    #[tokio::test]
    async fn missing_dialer_is_an_initialization_error() {
        let err = create_pool(&ConnectionSettings::default(), &built_in("a"), "b", None)
            .err()
            .unwrap();
        assert!(matches!(err, ConnectionError::DialerInit(_)));
        assert!(err.to_string().starts_with("failed to initialize connection"));
    }

    #[tokio::test]
    async fn every_checkout_dials_through_the_tunnel() {
        let dialer = Arc::new(RecordingDialer::default());
        let connection = ConnectionSettings {
            instance: InstanceCoordinates::new("p", "r", "c", "i"),
            ip_type: IpType::Private,
            ..Default::default()
        };

        let pool = create_pool(&connection, &iam("sa@p.iam"), "", Some(dialer.clone() as Arc<dyn Dialer>)).unwrap();
        assert_eq!(dialer.calls.load(Ordering::SeqCst), 0, "pool must be lazy");
        assert_eq!(pool.manager().target().instance_uri.as_str(), "projects/p/locations/r/clusters/c/instances/i");

        for attempt in 1..=2 {
            let err = pool.get().await.err().expect("dial must fail");
            assert!(matches!(err, PoolError::Backend(ConnectError::Dial(_))));
            assert_eq!(dialer.calls.load(Ordering::SeqCst), attempt);
        }

        let targets = dialer.targets.lock().unwrap();
        assert!(targets.iter().all(|t| {
            t.instance_uri.as_str() == "projects/p/locations/r/clusters/c/instances/i"
                && t.ip_type == IpType::Private
                && t.iam_auth
        }));
    }

    #[tokio::test]
    async fn pool_uses_configured_limits() {
        let connection = ConnectionSettings {
            pool: PoolSettings { max_size: 3, ..Default::default() },
            ..Default::default()
        };
        let dialer: Arc<dyn Dialer> = Arc::new(RecordingDialer::default());

        let pool = create_pool(&connection, &built_in("a"), "b", Some(dialer)).unwrap();
        assert_eq!(pool.status().max_size, 3);
        assert!(!pool.manager().target().iam_auth);
        assert_eq!(pool.manager().target().ip_type, IpType::Public);
    }
}
