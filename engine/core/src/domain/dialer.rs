// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Secure tunnel port
//!
//! A [`Dialer`] opens an authenticated, encrypted byte stream to one AlloyDB
//! instance addressed by its resource URI rather than host:port. The pool
//! only ever obtains connections through this trait.

use std::fmt;
use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::config::{InstanceCoordinates, IpType};

/// Byte stream returned by a dialer.
pub trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> AsyncStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

pub type TunnelStream = Box<dyn AsyncStream>;

/// `projects/<project>/locations/<region>/clusters/<cluster>/instances/<instance>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceUri(String);

impl InstanceUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&InstanceCoordinates> for InstanceUri {
    fn from(coords: &InstanceCoordinates) -> Self {
        Self(format!(
            "projects/{}/locations/{}/clusters/{}/instances/{}",
            coords.project_id, coords.region, coords.cluster, coords.instance
        ))
    }
}

impl fmt::Display for InstanceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a single dial attempt is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialTarget {
    pub instance_uri: InstanceUri,
    pub ip_type: IpType,
    /// The tunnel must authenticate the session with an IAM token, the
    /// startup message carries no password.
    pub iam_auth: bool,
}

#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, target: &DialTarget) -> io::Result<TunnelStream>;
}
