//! Configuration module for metrics-pusher.
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honoured by the binary), organized by concern: Gateway, Auth and Metrics.
//! The three deployments of the pusher differ only in auth scheme, secret
//! material and metric namespace, so they share this one configuration.

mod auth_config;
mod gateway_config;

pub use auth_config::AuthEnvConfig;
pub use gateway_config::{
    DEFAULT_GATEWAY_URL, DEFAULT_GROUPING, DEFAULT_JOB_NAME, GatewayEnvConfig, parse_grouping,
    parse_grouping_pair,
};

use crate::domain::credential::{Credential, build_credential};
use crate::domain::push_job::PushJob;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_NAMESPACE: &str = "db_backup";
pub const DEFAULT_SYNTHETIC_RUNS: u32 = 20;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub gateway: GatewayEnvConfig,
    pub auth: AuthEnvConfig,
    pub namespace: String,
    pub synthetic_runs: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let gateway = GatewayEnvConfig::from_env().context("Failed to load gateway config")?;
        let auth = AuthEnvConfig::from_env().context("Failed to load auth config")?;
        let namespace =
            env::var("METRIC_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());
        let synthetic_runs = env::var("PUSH_SYNTHETIC_RUNS")
            .unwrap_or_else(|_| DEFAULT_SYNTHETIC_RUNS.to_string())
            .parse::<u32>()
            .context("Failed to parse PUSH_SYNTHETIC_RUNS")?;

        Ok(Self {
            gateway,
            auth,
            namespace,
            synthetic_runs,
        })
    }

    pub fn credential(&self) -> Result<Credential> {
        build_credential(self.auth.scheme, self.auth.credential_data())
            .context("Failed to build gateway credential")
    }

    pub fn push_job(&self) -> PushJob {
        self.gateway.grouping.iter().fold(
            PushJob::new(&self.gateway.url, &self.gateway.job_name).method(self.gateway.method),
            |job, (name, value)| job.grouping(name, value),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.gateway.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway.connect_timeout_secs)
    }
}
