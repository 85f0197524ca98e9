/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Access key / secret key pair used to sign requests.

use std::fmt;
use thiserror::Error;

const ENV_ACCESS_KEY: &str = "SDK_ACCESS_KEY";
const ENV_SECRET_KEY: &str = "SDK_SECRET_KEY";

/// Error loading [`Credentials`] from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CredentialsError {
    /// A required environment variable was not set or was not valid unicode.
    #[error("environment variable `{0}` is not set")]
    NotSet(&'static str),
    /// A required environment variable was set to an empty string.
    #[error("environment variable `{0}` is empty")]
    Empty(&'static str),
}

/// The access key / secret key pair issued by the service.
///
/// The secret key never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    /// Creates credentials from an access key and a secret key.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Loads credentials from the `SDK_ACCESS_KEY` and `SDK_SECRET_KEY` environment variables.
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_env_fn(|name| std::env::var(name).ok())
    }

    fn from_env_fn(env: impl Fn(&str) -> Option<String>) -> Result<Self, CredentialsError> {
        let load = |name: &'static str| match env(name) {
            None => Err(CredentialsError::NotSet(name)),
            Some(value) if value.trim().is_empty() => Err(CredentialsError::Empty(name)),
            Some(value) => Ok(value),
        };
        let credentials = Self::new(load(ENV_ACCESS_KEY)?, load(ENV_SECRET_KEY)?);
        tracing::debug!(access_key = %credentials.access_key, "loaded credentials");
        Ok(credentials)
    }

    /// Returns the access key, the public half of the pair.
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Returns the secret key.
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .finish()
    }
}
