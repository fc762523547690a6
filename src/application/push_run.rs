//! One push run: populate the backup metrics, push them once, report.

use crate::config::Config;
use crate::domain::errors::PushError;
use crate::domain::push_job::PushJob;
use crate::infrastructure::observability::{BackupMetrics, MetricsSnapshot, PushReport, Pusher};
use anyhow::Result;
use tracing::{info, warn};

pub struct PushRun {
    metrics: BackupMetrics,
    job: PushJob,
    pusher: Pusher,
    synthetic_runs: u32,
}

impl PushRun {
    pub fn new(metrics: BackupMetrics, job: PushJob, pusher: Pusher, synthetic_runs: u32) -> Self {
        Self {
            metrics,
            job,
            pusher,
            synthetic_runs,
        }
    }

    /// Wire metrics, credential, job and HTTP client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let metrics = BackupMetrics::new(&config.namespace)?;
        let credential = config.credential()?;
        let pusher = Pusher::new(credential, config.timeout(), config.connect_timeout());
        Ok(Self::new(
            metrics,
            config.push_job(),
            pusher,
            config.synthetic_runs,
        ))
    }

    pub fn metrics(&self) -> &BackupMetrics {
        &self.metrics
    }

    pub fn job(&self) -> &PushJob {
        &self.job
    }

    /// Record the synthetic runs into the metrics
    pub fn populate(&self) {
        self.metrics.record_synthetic_runs(self.synthetic_runs);
        info!(
            "PushRun: recorded {} jobs under namespace '{}'",
            self.metrics.job_finish_count.get(),
            self.metrics.namespace()
        );
    }

    /// Populate and encode without pushing
    pub fn preview(&self) -> Result<MetricsSnapshot, PushError> {
        self.populate();
        Pusher::snapshot(&self.job, self.metrics.registry())
    }

    /// Populate, then push exactly once.
    ///
    /// The error is returned untouched; deciding how to report it is up to the caller.
    pub async fn execute(&self) -> Result<PushReport, PushError> {
        self.populate();
        let report = self.pusher.push(&self.job, self.metrics.registry()).await?;
        match serde_json::to_string(&report) {
            // Prefix so log shippers can pick the line out of stdout
            Ok(json) => println!("PUSH_JSON:{}", json),
            Err(e) => warn!("Failed to serialize push report: {}", e),
        }
        Ok(report)
    }
}
