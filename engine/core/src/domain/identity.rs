// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Identity resolution
//!
//! Decides which database user the engine connects as and whether the
//! secure tunnel has to authenticate with an IAM token. The rules form a
//! strict precedence chain evaluated top to bottom:
//!
//! 1. user **and** password set: built-in authentication as that user
//! 2. IAM account email set: IAM authentication as that principal
//! 3. nothing set: ask the [`EmailRetriever`] for the ambient principal
//! 4. anything else (a lone user or a lone password): error

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Looks up the email of the IAM principal the process runs as.
#[async_trait]
pub trait EmailRetriever: Send + Sync {
    async fn retrieve_email(&self) -> anyhow::Result<String>;
}

/// Credential fields as configured. Empty means unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub iam_account_email: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "<redacted>" })
            .field("iam_account_email", &self.iam_account_email)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user: String,
    pub iam_auth: bool,
}

impl ResolvedIdentity {
    fn built_in(user: impl Into<String>) -> Self {
        Self { user: user.into(), iam_auth: false }
    }

    fn iam(principal: impl Into<String>) -> Self {
        Self { user: principal.into(), iam_auth: true }
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unable to retrieve a valid username")]
    NoValidUser,

    #[error("unable to retrieve service account email: {0}")]
    EmailRetrieval(#[source] anyhow::Error),
}

/// Resolve the identity for `credentials`. Only rule 3 performs I/O, and
/// only rule 3 touches `retriever`.
pub async fn resolve_identity(
    credentials: &Credentials,
    retriever: &dyn EmailRetriever,
) -> Result<ResolvedIdentity, IdentityError> {
    let has_user = !credentials.user.is_empty();
    let has_password = !credentials.password.is_empty();
    let has_email = !credentials.iam_account_email.is_empty();

    match (has_user, has_password, has_email) {
        (true, true, _) => {
            debug!(user = %credentials.user, "using built-in database authentication");
            Ok(ResolvedIdentity::built_in(credentials.user.clone()))
        }
        (_, _, true) => {
            debug!(principal = %credentials.iam_account_email, "using IAM authentication with configured principal");
            Ok(ResolvedIdentity::iam(credentials.iam_account_email.clone()))
        }
        (false, false, false) => {
            let email = retriever
                .retrieve_email()
                .await
                .map_err(IdentityError::EmailRetrieval)?;
            if email.is_empty() {
                return Err(IdentityError::EmailRetrieval(anyhow::anyhow!(
                    "identity provider returned an empty email"
                )));
            }
            debug!(principal = %email, "using IAM authentication with ambient principal");
            Ok(ResolvedIdentity::iam(email))
        }
        _ => Err(IdentityError::NoValidUser),
    }
}
