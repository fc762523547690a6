//! Gateway configuration parsing from environment variables.
//!
//! This module handles where the snapshot is pushed and under which job and
//! grouping key it is stored.

use crate::domain::push_job::PushMethod;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:9091";
pub const DEFAULT_JOB_NAME: &str = "db_backup";
pub const DEFAULT_GROUPING: &str = "instance=cluster01";

/// Pushgateway environment configuration
#[derive(Debug, Clone)]
pub struct GatewayEnvConfig {
    pub url: String,
    pub job_name: String,
    pub grouping: Vec<(String, String)>,
    pub method: PushMethod,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl GatewayEnvConfig {
    pub fn from_env() -> Result<Self> {
        let grouping = env::var("PUSH_GROUPING").unwrap_or_else(|_| DEFAULT_GROUPING.to_string());
        let method = env::var("PUSH_METHOD").unwrap_or_else(|_| "put".to_string());

        Ok(Self {
            url: env::var("PUSHGATEWAY_URL").unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
            job_name: env::var("PUSH_JOB_NAME").unwrap_or_else(|_| DEFAULT_JOB_NAME.to_string()),
            grouping: parse_grouping(&grouping).context("Failed to parse PUSH_GROUPING")?,
            method: PushMethod::from_str(&method).context("Failed to parse PUSH_METHOD")?,
            timeout_secs: Self::parse_u64("PUSH_TIMEOUT_SECS", 10)?,
            connect_timeout_secs: Self::parse_u64("PUSH_CONNECT_TIMEOUT_SECS", 5)?,
        })
    }

    fn parse_u64(key: &str, default: u64) -> Result<u64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<u64>()
            .context(format!("Failed to parse {}", key))
    }
}

/// Parse a single `name=value` grouping pair. Values may be empty.
pub fn parse_grouping_pair(pair: &str) -> Result<(String, String)> {
    let (name, value) = pair
        .split_once('=')
        .with_context(|| format!("Grouping entry {:?} must look like name=value", pair))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

/// Parse comma-separated `name=value` pairs, preserving order
pub fn parse_grouping(raw: &str) -> Result<Vec<(String, String)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_grouping_pair)
        .collect()
}
