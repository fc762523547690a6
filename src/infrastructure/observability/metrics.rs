//! Prometheus metrics pushed after a backup job
//!
//! Every metric name carries the configured namespace as prefix, so the same
//! set can be reused by several jobs pushing to one gateway.

use crate::infrastructure::observability::latency_tracker::TimeCostGuard;
use crate::infrastructure::observability::summary::{Summary, SummaryOpts};
use prometheus::{Counter, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Histogram buckets for the job time cost, in seconds
pub const TIME_COST_BUCKETS: [f64; 5] = [4.0, 8.0, 16.0, 32.0, 64.0];

/// Quantiles reported by the time-cost summary
pub const TIME_COST_OBJECTIVES: [f64; 3] = [0.5, 0.8, 0.95];

/// Instruments describing backup runs
#[derive(Clone)]
pub struct BackupMetrics {
    registry: Arc<Registry>,
    namespace: String,
    /// Unix timestamp of the last successful completion
    pub last_completion_timestamp_seconds: Gauge,
    /// Number of finished jobs
    pub job_finish_count: Counter,
    /// Time cost of every run, bucketed
    pub histogram_timecost_seconds: Histogram,
    /// Time cost of every run, as quantiles
    pub summary_timecost_seconds: Summary,
}

impl BackupMetrics {
    /// Create and register the instruments under `namespace`
    pub fn new(namespace: &str) -> anyhow::Result<Self> {
        let registry = Registry::new();

        let last_completion_timestamp_seconds = Gauge::with_opts(
            Opts::new(
                "last_completion_timestamp_seconds",
                "The timestamp of the last successful completion of a DB backup.",
            )
            .namespace(namespace),
        )?;
        registry.register(Box::new(last_completion_timestamp_seconds.clone()))?;

        let job_finish_count = Counter::with_opts(
            Opts::new("job_finish_count", "The total jobs finish").namespace(namespace),
        )?;
        registry.register(Box::new(job_finish_count.clone()))?;

        let histogram_timecost_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "histogram_timecost_seconds",
                "The time cost every time to db backup",
            )
            .namespace(namespace)
            .buckets(TIME_COST_BUCKETS.to_vec()),
        )?;
        registry.register(Box::new(histogram_timecost_seconds.clone()))?;

        let summary_timecost_seconds = Summary::with_opts(
            SummaryOpts::new(
                "summary_timecost_seconds",
                "The time cost every time to db backup",
            )
            .namespace(namespace)
            .objectives(TIME_COST_OBJECTIVES.to_vec()),
        )?;
        registry.register(Box::new(summary_timecost_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            namespace: namespace.to_string(),
            last_completion_timestamp_seconds,
            job_finish_count,
            histogram_timecost_seconds,
            summary_timecost_seconds,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Count a finished job and record how long it took
    pub fn record_job(&self, time_cost_seconds: f64) {
        self.job_finish_count.inc();
        self.histogram_timecost_seconds.observe(time_cost_seconds);
        self.summary_timecost_seconds.observe(time_cost_seconds);
    }

    /// Guard that records the elapsed time into both time-cost instruments on drop
    pub fn start_timer(&self) -> TimeCostGuard {
        TimeCostGuard::new(
            self.histogram_timecost_seconds.clone(),
            self.summary_timecost_seconds.clone(),
        )
    }

    pub fn mark_completed_now(&self) {
        let now = chrono::Utc::now();
        self.last_completion_timestamp_seconds
            .set(now.timestamp_millis() as f64 / 1000.0);
    }

    /// Record `runs - 1` synthetic jobs costing 2, 4, .. seconds, then stamp completion
    pub fn record_synthetic_runs(&self, runs: u32) {
        for i in 1..runs {
            self.record_job(f64::from(i) * 2.0);
        }
        self.mark_completed_now();
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = BackupMetrics::new("db_backup").expect("Failed to create metrics");
        let output = metrics.render();
        assert!(output.contains("db_backup_last_completion_timestamp_seconds"));
        assert!(output.contains("db_backup_job_finish_count"));
        assert!(output.contains("db_backup_histogram_timecost_seconds"));
        assert!(output.contains("db_backup_summary_timecost_seconds"));
    }

    #[test]
    fn test_namespace_prefix() {
        let metrics = BackupMetrics::new("nightly").expect("Failed to create metrics");
        assert_eq!(metrics.namespace(), "nightly");
        let output = metrics.render();
        assert!(output.contains("nightly_job_finish_count 0"));
        assert!(!output.contains("db_backup_"));
    }

    #[test]
    fn test_synthetic_runs() {
        let metrics = BackupMetrics::new("db_backup").expect("Failed to create metrics");
        metrics.record_synthetic_runs(20);

        assert_eq!(metrics.job_finish_count.get(), 19.0);
        assert_eq!(metrics.histogram_timecost_seconds.get_sample_count(), 19);
        assert_eq!(metrics.summary_timecost_seconds.get_sample_count(), 19);
        assert!(metrics.last_completion_timestamp_seconds.get() > 1_600_000_000.0);

        let output = metrics.render();
        assert!(output.contains("db_backup_job_finish_count 19"));
        // 2, 4, 6 and 8 fall in the le=8 bucket
        assert!(output.contains("db_backup_histogram_timecost_seconds_bucket{le=\"8\"} 4"));
        assert!(output.contains("db_backup_histogram_timecost_seconds_bucket{le=\"+Inf\"} 19"));
        assert!(output.contains("db_backup_summary_timecost_seconds_count 19"));
    }

    #[test]
    fn test_timer_records_into_time_cost_instruments() {
        let metrics = BackupMetrics::new("db_backup").expect("Failed to create metrics");
        drop(metrics.start_timer());
        assert_eq!(metrics.histogram_timecost_seconds.get_sample_count(), 1);
        assert_eq!(metrics.summary_timecost_seconds.get_sample_count(), 1);
        // Timing a run does not count it as finished
        assert_eq!(metrics.job_finish_count.get(), 0.0);
    }
}
