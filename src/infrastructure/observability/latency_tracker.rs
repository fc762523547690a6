use crate::infrastructure::observability::summary::Summary;
use prometheus::Histogram;
use std::time::Instant;

/// RAII guard recording the elapsed time of a job into its time-cost instruments
pub struct TimeCostGuard {
    start: Instant,
    histogram: Histogram,
    summary: Summary,
}

impl TimeCostGuard {
    pub fn new(histogram: Histogram, summary: Summary) -> Self {
        Self {
            start: Instant::now(),
            histogram,
            summary,
        }
    }
}

impl Drop for TimeCostGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        self.histogram.observe(elapsed);
        self.summary.observe(elapsed);
    }
}
