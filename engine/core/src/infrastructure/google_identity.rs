// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Google identity provider adapter
//
// Anti-Corruption Layer over the two Google calls identity resolution needs:
// obtaining default credentials (an OAuth access token) and asking the
// userinfo endpoint which principal that token belongs to.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::identity::EmailRetriever;

pub const METADATA_ENDPOINT: &str = "http://metadata.google.internal";
pub const USERINFO_ENDPOINT: &str = "https://www.googleapis.com";
pub const USERINFO_EMAIL_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

#[derive(Debug, Error)]
pub enum GoogleIdentityError {
    #[error("unable to get default credentials: {0}")]
    DefaultCredentials(String),

    #[error("missing or invalid credentials")]
    MissingCredentials,

    #[error("failed to get user info: {0}")]
    UserInfo(String),
}

/// Source of OAuth access tokens ("default credentials").
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, GoogleIdentityError>;
}

/// Tokens from the GCE / Cloud Run metadata server.
pub struct MetadataServerTokenSource {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct MetadataToken {
    #[serde(default)]
    access_token: String,
}

impl MetadataServerTokenSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for MetadataServerTokenSource {
    fn default() -> Self {
        Self::new(METADATA_ENDPOINT)
    }
}

#[async_trait]
impl TokenSource for MetadataServerTokenSource {
    async fn access_token(&self) -> Result<String, GoogleIdentityError> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            self.endpoint.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .query(&[("scopes", USERINFO_EMAIL_SCOPE)])
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| GoogleIdentityError::DefaultCredentials(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleIdentityError::DefaultCredentials(format!(
                "metadata server returned HTTP {}",
                response.status()
            )));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| GoogleIdentityError::DefaultCredentials(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(GoogleIdentityError::MissingCredentials);
        }
        Ok(token.access_token)
    }
}

/// A fixed, externally obtained access token.
pub struct StaticTokenSource(String);

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, GoogleIdentityError> {
        if self.0.is_empty() {
            return Err(GoogleIdentityError::MissingCredentials);
        }
        Ok(self.0.clone())
    }
}

/// Resolves the principal email through the OAuth2 userinfo endpoint.
pub struct UserinfoEmailRetriever<T> {
    client: reqwest::Client,
    endpoint: String,
    token_source: T,
}

#[derive(Deserialize)]
struct Userinfo {
    email: Option<String>,
}

impl<T: TokenSource> UserinfoEmailRetriever<T> {
    pub fn new(token_source: T) -> Self {
        Self::with_endpoint(token_source, USERINFO_ENDPOINT)
    }

    pub fn with_endpoint(token_source: T, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token_source,
        }
    }

    async fn fetch_email(&self) -> Result<String, GoogleIdentityError> {
        let token = self.token_source.access_token().await?;
        let url = format!("{}/oauth2/v2/userinfo", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| GoogleIdentityError::UserInfo(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleIdentityError::UserInfo(format!("HTTP {}: {}", status, body)));
        }

        let userinfo: Userinfo = response
            .json()
            .await
            .map_err(|e| GoogleIdentityError::UserInfo(e.to_string()))?;

        userinfo
            .email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| GoogleIdentityError::UserInfo("response carried no email".into()))
    }
}

#[async_trait]
impl<T: TokenSource> EmailRetriever for UserinfoEmailRetriever<T> {
    async fn retrieve_email(&self) -> anyhow::Result<String> {
        Ok(self.fetch_email().await?)
    }
}

pub fn default_email_retriever() -> Arc<dyn EmailRetriever> {
    Arc::new(UserinfoEmailRetriever::new(MetadataServerTokenSource::default()))
}
