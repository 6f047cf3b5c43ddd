// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Connection target value types
//!
//! Instance coordinates, network path and pool sizing. The bundle that also
//! carries credentials and collaborators is
//! [`crate::application::config::EngineConfig`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DATABASE: &str = "postgres";

/// Which network path the secure tunnel should take to the instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IpType {
    #[default]
    Public,
    Private,
}

impl fmt::Display for IpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpType::Public => write!(f, "PUBLIC"),
            IpType::Private => write!(f, "PRIVATE"),
        }
    }
}

impl FromStr for IpType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PUBLIC" => Ok(IpType::Public),
            "PRIVATE" => Ok(IpType::Private),
            other => Err(format!("invalid ip type '{other}', expected PUBLIC or PRIVATE")),
        }
    }
}

/// Project / region / cluster / instance of the target AlloyDB instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceCoordinates {
    pub project_id: String,
    pub region: String,
    pub cluster: String,
    pub instance: String,
}

impl InstanceCoordinates {
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        cluster: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            cluster: cluster.into(),
            instance: instance.into(),
        }
    }

    /// Names of the coordinates that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("project_id", &self.project_id),
            ("region", &self.region),
            ("cluster", &self.cluster),
            ("instance", &self.instance),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Sizing and timeouts handed to the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_size: usize,
    pub wait_timeout_secs: u64,
    pub create_timeout_secs: u64,
    pub recycle_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 10,
            wait_timeout_secs: 30,
            create_timeout_secs: 30,
            recycle_timeout_secs: 5,
        }
    }
}

impl PoolSettings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_secs)
    }

    pub fn recycle_timeout(&self) -> Duration {
        Duration::from_secs(self.recycle_timeout_secs)
    }
}

/// Where pooled connections go and how many of them may exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub instance: InstanceCoordinates,
    pub database: String,
    pub ip_type: IpType,
    pub pool: PoolSettings,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            instance: InstanceCoordinates::default(),
            database: DEFAULT_DATABASE.to_string(),
            ip_type: IpType::default(),
            pool: PoolSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_defaults() {
        let connection = ConnectionSettings::default();
        assert_eq!(connection.database, DEFAULT_DATABASE);
        assert_eq!(connection.ip_type, IpType::Public);
        assert_eq!(connection.pool, PoolSettings::default());
        assert_eq!(connection.pool.recycle_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn ip_type_parses_case_insensitively() {
        assert_eq!("private".parse::<IpType>().unwrap(), IpType::Private);
        assert_eq!(" PUBLIC ".parse::<IpType>().unwrap(), IpType::Public);
        assert!("internal".parse::<IpType>().is_err());
    }

    #[test]
    fn missing_coordinates_are_reported_in_order() {
        let coords = InstanceCoordinates::new("p", "", "c", "");
        assert_eq!(coords.missing_fields(), vec!["region", "instance"]);
    }
}
