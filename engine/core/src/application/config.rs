// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Engine configuration bundle
//!
//! [`EngineConfig`] is assembled by [`EngineConfigBuilder`], where every
//! setter touches exactly one field. Setters can be applied in any order;
//! credential combinations are only judged later by
//! [`crate::domain::identity::resolve_identity`].

use std::fmt;
use std::sync::Arc;

use crate::domain::config::{ConnectionSettings, InstanceCoordinates, IpType, PoolSettings};
use crate::domain::dialer::Dialer;
use crate::domain::identity::{Credentials, EmailRetriever};
use crate::domain::settings::EngineSettings;
use crate::infrastructure::pool::Pool;
use crate::infrastructure::proxy_dialer::ProxyDialer;

/// Everything the engine needs to pick an identity and open a pool.
#[derive(Clone, Default)]
pub struct EngineConfig {
    pub(crate) credentials: Credentials,
    pub(crate) connection: ConnectionSettings,
    pub(crate) pool: Option<Pool>,
    pub(crate) email_retriever: Option<Arc<dyn EmailRetriever>>,
    pub(crate) dialer: Option<Arc<dyn Dialer>>,
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn connection(&self) -> &ConnectionSettings {
        &self.connection
    }

    pub fn instance(&self) -> &InstanceCoordinates {
        &self.connection.instance
    }

    pub fn user(&self) -> &str {
        &self.credentials.user
    }

    pub fn database(&self) -> &str {
        &self.connection.database
    }

    pub fn iam_account_email(&self) -> &str {
        &self.credentials.iam_account_email
    }

    pub fn ip_type(&self) -> IpType {
        self.connection.ip_type
    }

    pub fn pool_settings(&self) -> &PoolSettings {
        &self.connection.pool
    }

    pub fn has_pool(&self) -> bool {
        self.pool.is_some()
    }

    pub fn has_dialer(&self) -> bool {
        self.dialer.is_some()
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("credentials", &self.credentials)
            .field("connection", &self.connection)
            .field("pool", &self.pool.is_some())
            .field("email_retriever", &self.email_retriever.is_some())
            .field("dialer", &self.dialer.is_some())
            .finish()
    }
}

/// Accumulates independent option values into an [`EngineConfig`].
#[derive(Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Builder pre-filled from a settings document. A `proxy` section wires
    /// a [`ProxyDialer`]; callers may keep chaining to override anything.
    pub fn from_settings(settings: &EngineSettings) -> Self {
        let mut builder = Self::default()
            .instance_coordinates(settings.instance.clone())
            .database(settings.database.clone())
            .ip_type(settings.ip_type)
            .pool_settings(settings.pool.clone());

        if let Some(user) = &settings.user {
            builder = builder.user(user.clone());
        }
        if let Some(password) = &settings.password {
            builder = builder.password(password.clone());
        }
        if let Some(email) = &settings.iam_account_email {
            builder = builder.iam_account_email(email.clone());
        }
        if let Some(proxy) = &settings.proxy {
            builder = builder.dialer(Arc::new(ProxyDialer::new(
                proxy.public_addr.clone(),
                proxy.private_addr.clone(),
            )));
        }

        builder
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.config.credentials.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.credentials.password = password.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.connection.database = database.into();
        self
    }

    /// IAM principal to authenticate as instead of built-in credentials.
    pub fn iam_account_email(mut self, email: impl Into<String>) -> Self {
        self.config.credentials.iam_account_email = email.into();
        self
    }

    pub fn instance(
        mut self,
        project_id: impl Into<String>,
        region: impl Into<String>,
        cluster: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        self.config.connection.instance = InstanceCoordinates::new(project_id, region, cluster, instance);
        self
    }

    pub fn instance_coordinates(mut self, coordinates: InstanceCoordinates) -> Self {
        self.config.connection.instance = coordinates;
        self
    }

    pub fn ip_type(mut self, ip_type: IpType) -> Self {
        self.config.connection.ip_type = ip_type;
        self
    }

    /// Use an existing pool; the engine then never dials on its own.
    pub fn pool(mut self, pool: Pool) -> Self {
        self.config.pool = Some(pool);
        self
    }

    pub fn email_retriever(mut self, retriever: Arc<dyn EmailRetriever>) -> Self {
        self.config.email_retriever = Some(retriever);
        self
    }

    pub fn dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.config.dialer = Some(dialer);
        self
    }

    pub fn pool_settings(mut self, settings: PoolSettings) -> Self {
        self.config.connection.pool = settings;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}
