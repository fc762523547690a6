//! Gateway authentication parsing from environment variables.

use crate::domain::credential::{AuthScheme, CredentialData};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Authentication environment configuration
#[derive(Clone)]
pub struct AuthEnvConfig {
    pub scheme: AuthScheme,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AuthEnvConfig {
    pub fn from_env() -> Result<Self> {
        let scheme = env::var("PUSH_AUTH_SCHEME").unwrap_or_else(|_| "bearer".to_string());

        Ok(Self {
            scheme: AuthScheme::from_str(&scheme).context("Failed to parse PUSH_AUTH_SCHEME")?,
            token: env::var("PUSH_BEARER_TOKEN").ok(),
            username: env::var("PUSH_BASIC_USERNAME").ok(),
            password: env::var("PUSH_BASIC_PASSWORD").ok(),
        })
    }

    pub fn credential_data(&self) -> CredentialData {
        CredentialData {
            token: self.token.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl std::fmt::Debug for AuthEnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEnvConfig")
            .field("scheme", &self.scheme)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
