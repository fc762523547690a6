//! metrics-pusher - push backup metrics to a Prometheus Pushgateway
//!
//! Populates the backup metric set, pushes one snapshot with bearer or basic
//! authentication, and exits. A failed push is logged; the process still
//! exits normally.
//!
//! # Usage
//! ```sh
//! PUSH_BEARER_TOKEN=token cargo run -- --gateway-url https://io.telemetrytower.com/pushgateway
//! cargo run -- --auth basic --username ops --password secret --namespace nightly_backup
//! ```
//!
//! # Environment Variables
//! - `PUSHGATEWAY_URL`, `PUSH_JOB_NAME`, `PUSH_GROUPING`, `PUSH_METHOD`
//! - `PUSH_AUTH_SCHEME`, `PUSH_BEARER_TOKEN`, `PUSH_BASIC_USERNAME`, `PUSH_BASIC_PASSWORD`
//! - `METRIC_NAMESPACE`, `PUSH_SYNTHETIC_RUNS`, `PUSH_TIMEOUT_SECS`, `PUSH_CONNECT_TIMEOUT_SECS`

use anyhow::{Context, Result};
use clap::Parser;
use metrics_pusher::application::PushRun;
use metrics_pusher::config::{Config, parse_grouping_pair};
use metrics_pusher::domain::credential::AuthScheme;
use metrics_pusher::domain::push_job::PushMethod;
use std::str::FromStr;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Push backup metrics to a Prometheus Pushgateway", long_about = None)]
struct Cli {
    /// Pushgateway base URL
    #[arg(long)]
    gateway_url: Option<String>,

    /// Job name
    #[arg(short, long)]
    job: Option<String>,

    /// Grouping label as name=value (repeatable, replaces PUSH_GROUPING)
    #[arg(short, long)]
    grouping: Vec<String>,

    /// HTTP method (put, post)
    #[arg(long)]
    method: Option<String>,

    /// Metric namespace prefix
    #[arg(short, long)]
    namespace: Option<String>,

    /// Auth scheme (bearer, basic)
    #[arg(long)]
    auth: Option<String>,

    /// Bearer token
    #[arg(long)]
    token: Option<String>,

    /// Basic auth username
    #[arg(long)]
    username: Option<String>,

    /// Basic auth password
    #[arg(long)]
    password: Option<String>,

    /// Number of synthetic runs to record before pushing
    #[arg(long)]
    runs: Option<u32>,

    /// Print the encoded metrics instead of pushing them
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Flags win over the environment
    fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(url) = self.gateway_url {
            config.gateway.url = url;
        }
        if let Some(job) = self.job {
            config.gateway.job_name = job;
        }
        if !self.grouping.is_empty() {
            config.gateway.grouping = self
                .grouping
                .iter()
                .map(|pair| parse_grouping_pair(pair))
                .collect::<Result<_>>()
                .context("Invalid --grouping")?;
        }
        if let Some(method) = self.method {
            config.gateway.method = PushMethod::from_str(&method).context("Invalid --method")?;
        }
        if let Some(namespace) = self.namespace {
            config.namespace = namespace;
        }
        if let Some(auth) = self.auth {
            config.auth.scheme = AuthScheme::from_str(&auth).context("Invalid --auth")?;
        }
        if self.token.is_some() {
            config.auth.token = self.token;
        }
        if self.username.is_some() {
            config.auth.username = self.username;
        }
        if self.password.is_some() {
            config.auth.password = self.password;
        }
        if let Some(runs) = self.runs {
            config.synthetic_runs = runs;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let dry_run = cli.dry_run;

    let mut config = Config::from_env()?;
    cli.apply(&mut config)?;
    info!(
        "metrics-pusher {}: gateway={}, job={}, namespace={}, auth={}",
        env!("CARGO_PKG_VERSION"),
        config.gateway.url,
        config.gateway.job_name,
        config.namespace,
        config.auth.scheme.as_str()
    );

    let run = PushRun::from_config(&config)?;

    if dry_run {
        let snapshot = run.preview()?;
        print!("{}", snapshot.body);
        return Ok(());
    }

    match run.execute().await {
        Ok(report) => info!(
            "Pushed {} metric families to {} ({})",
            report.metric_families, report.endpoint, report.status
        ),
        Err(e) => error!("Could not push metrics to Pushgateway: {}", e),
    }

    Ok(())
}
