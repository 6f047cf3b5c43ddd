// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Engine settings file (alloydb-engine.yaml)
//
// File-backed counterpart of EngineConfig used by the CLI and by services that
// prefer configuration files over code:
// - instance coordinates and database name
// - built-in credentials or IAM principal
// - network path and local proxy endpoints
// - pool sizing and timeouts

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::config::{InstanceCoordinates, IpType, PoolSettings, DEFAULT_DATABASE};

pub const CONFIG_PATH_ENV: &str = "ALLOYDB_ENGINE_CONFIG";
pub const CONFIG_FILE_NAME: &str = "alloydb-engine.yaml";

/// Top-level settings document
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Target instance
    pub instance: InstanceCoordinates,

    /// Database to connect to
    pub database: String,

    /// Built-in database user (requires `password`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// IAM principal to authenticate as
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_account_email: Option<String>,

    /// PUBLIC or PRIVATE
    pub ip_type: IpType,

    /// Local auth proxy endpoints the tunnel is reached through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxySettings>,

    pub pool: PoolSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    /// host:port serving the public IP path
    pub public_addr: String,

    /// host:port serving the private IP path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_addr: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            instance: InstanceCoordinates::default(),
            database: DEFAULT_DATABASE.to_string(),
            user: None,
            password: None,
            iam_account_email: None,
            ip_type: IpType::default(),
            proxy: None,
            pool: PoolSettings::default(),
        }
    }
}

impl fmt::Debug for EngineSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSettings")
            .field("instance", &self.instance)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("iam_account_email", &self.iam_account_email)
            .field("ip_type", &self.ip_type)
            .field("proxy", &self.proxy)
            .field("pool", &self.pool)
            .finish()
    }
}

impl EngineSettings {
    /// Load settings from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let settings = serde_yaml::from_str(yaml)?;
        Ok(settings)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover a settings file using precedence order
    /// 1. ALLOYDB_ENGINE_CONFIG environment variable
    /// 2. ./alloydb-engine.yaml (working directory)
    /// 3. ~/.alloydb-engine/config.yaml (user home)
    /// 4. /etc/alloydb-engine/config.yaml (Unix only)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from(format!("./{CONFIG_FILE_NAME}"));
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".alloydb-engine").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/alloydb-engine/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Explicit path, then discovery, then defaults; environment overrides
    /// are applied in every case.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut settings = if let Some(path) = cli_path {
            tracing::info!("Loading settings from explicit path: {:?}", path);
            Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load settings at {:?}: {}", path, e))?
        } else if let Some(path) = Self::discover_config() {
            tracing::info!("Loading settings from discovered path: {:?}", path);
            Self::from_yaml_file(path)?
        } else {
            tracing::warn!("No settings file found in standard locations. Using defaults.");
            Self::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply `ALLOYDB_*` overrides read through `lookup`.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(user) = non_empty("ALLOYDB_USERNAME") {
            tracing::info!("Environment override: ALLOYDB_USERNAME");
            self.user = Some(user);
        }
        if let Some(password) = non_empty("ALLOYDB_PASSWORD") {
            tracing::info!("Environment override: ALLOYDB_PASSWORD");
            self.password = Some(password);
        }
        if let Some(database) = non_empty("ALLOYDB_DATABASE") {
            tracing::info!("Environment override: ALLOYDB_DATABASE={}", database);
            self.database = database;
        }
        if let Some(email) = non_empty("ALLOYDB_IAM_ACCOUNT_EMAIL") {
            tracing::info!("Environment override: ALLOYDB_IAM_ACCOUNT_EMAIL={}", email);
            self.iam_account_email = Some(email);
        }
        if let Some(project_id) = non_empty("ALLOYDB_PROJECT_ID") {
            self.instance.project_id = project_id;
        }
        if let Some(region) = non_empty("ALLOYDB_REGION") {
            self.instance.region = region;
        }
        if let Some(cluster) = non_empty("ALLOYDB_CLUSTER") {
            self.instance.cluster = cluster;
        }
        if let Some(instance) = non_empty("ALLOYDB_INSTANCE") {
            self.instance.instance = instance;
        }
        if let Some(value) = non_empty("ALLOYDB_IP_TYPE") {
            match value.parse() {
                Ok(ip_type) => {
                    tracing::info!("Environment override: ALLOYDB_IP_TYPE={}", ip_type);
                    self.ip_type = ip_type;
                }
                Err(e) => tracing::warn!("Ignoring ALLOYDB_IP_TYPE: {}", e),
            }
        }
    }

    /// Validate settings
    pub fn validate(&self) -> anyhow::Result<()> {
        let missing = self.instance.missing_fields();
        if !missing.is_empty() {
            anyhow::bail!("instance is missing: {}", missing.join(", "));
        }

        if self.database.is_empty() {
            anyhow::bail!("database cannot be empty");
        }

        if self.pool.max_size == 0 {
            anyhow::bail!("pool.max_size must be greater than 0");
        }

        // The proxy section is the only dialer a settings file can describe.
        let Some(proxy) = &self.proxy else {
            anyhow::bail!("proxy section is required: connections are dialed through the auth proxy");
        };
        if proxy.public_addr.is_empty() {
            anyhow::bail!("proxy.public_addr cannot be empty");
        }
        if self.ip_type == IpType::Private && proxy.private_addr.is_none() {
            anyhow::bail!("ip_type is PRIVATE but proxy.private_addr is not set");
        }

        Ok(())
    }
}
