// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Dialer that reaches the instance through a locally running auth proxy.
//!
//! The proxy terminates the secure tunnel; this dialer only picks the proxy
//! listener that serves the requested network path.

use std::io;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

use crate::domain::config::IpType;
use crate::domain::dialer::{DialTarget, Dialer, TunnelStream};

#[derive(Debug, Clone)]
pub struct ProxyDialer {
    public_addr: String,
    private_addr: Option<String>,
}

impl ProxyDialer {
    pub fn new(public_addr: impl Into<String>, private_addr: Option<String>) -> Self {
        Self {
            public_addr: public_addr.into(),
            private_addr,
        }
    }

    fn addr_for(&self, target: &DialTarget) -> io::Result<&str> {
        match target.ip_type {
            IpType::Public => Ok(&self.public_addr),
            IpType::Private => self.private_addr.as_deref().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("no private proxy endpoint configured for {}", target.instance_uri),
                )
            }),
        }
    }
}

#[async_trait]
impl Dialer for ProxyDialer {
    async fn dial(&self, target: &DialTarget) -> io::Result<TunnelStream> {
        let addr = self.addr_for(target)?;
        debug!(instance = %target.instance_uri, %addr, "connecting to auth proxy");
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::InstanceCoordinates;
    use crate::domain::dialer::InstanceUri;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn target(ip_type: IpType) -> DialTarget {
        DialTarget {
            instance_uri: InstanceUri::from(&InstanceCoordinates::new("p", "r", "c", "i")),
            ip_type,
            iam_auth: false,
        }
    }

    #[tokio::test]
    async fn public_path_uses_public_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let accept = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4];
            socket.read_exact(&mut buf).await.unwrap();
            buf
        });

        let dialer = ProxyDialer::new(addr, None);
        let mut stream = dialer.dial(&target(IpType::Public)).await.unwrap();
        stream.write_all(b"ping").await.unwrap();

        assert_eq!(&accept.await.unwrap(), b"ping");
    }

    #[tokio::test]
    async fn private_path_without_endpoint_fails() {
        let dialer = ProxyDialer::new("127.0.0.1:5432", None);
        let err = dialer.dial(&target(IpType::Private)).await.err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::AddrNotAvailable);
        assert!(err.to_string().contains("projects/p/locations/r/clusters/c/instances/i"));
    }

    #[test]
    fn private_path_selects_private_endpoint() {
        let dialer = ProxyDialer::new("127.0.0.1:5432", Some("10.0.0.2:5432".into()));
        assert_eq!(dialer.addr_for(&target(IpType::Private)).unwrap(), "10.0.0.2:5432");
        assert_eq!(dialer.addr_for(&target(IpType::Public)).unwrap(), "127.0.0.1:5432");
    }
}
