//! Push-based observability
//!
//! Metrics leave the process through **outbound pushes only** - no HTTP server,
//! no incoming requests. Instruments are gathered into a snapshot, encoded in
//! the Prometheus text format and sent to a Pushgateway.

pub mod latency_tracker;
pub mod metrics;
pub mod pusher;
pub mod summary;

pub use latency_tracker::TimeCostGuard;
pub use metrics::BackupMetrics;
pub use pusher::{MetricsSnapshot, PushReport, Pusher, push};
pub use summary::{Summary, SummaryOpts};
