//! Summary instrument
//!
//! The `prometheus` crate has no summary type, so this collector fills the gap.
//! Quantiles are exact: every observation is kept and ranked at collect time,
//! which is fine for one-shot jobs that record a bounded number of samples.

use prometheus::Opts;
use prometheus::core::{Collector, Desc, Describer};
use prometheus::proto::{self, MetricFamily, MetricType};
use std::sync::{Arc, Mutex, MutexGuard};

/// Options for a [`Summary`]
#[derive(Clone, Debug)]
pub struct SummaryOpts {
    pub common_opts: Opts,
    /// Quantile ranks to report, each in `[0, 1]`
    pub objectives: Vec<f64>,
}

impl SummaryOpts {
    pub fn new<S1: Into<String>, S2: Into<String>>(name: S1, help: S2) -> Self {
        Self {
            common_opts: Opts::new(name, help),
            objectives: Vec::new(),
        }
    }

    pub fn namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.common_opts = self.common_opts.namespace(namespace);
        self
    }

    pub fn objectives(mut self, objectives: Vec<f64>) -> Self {
        self.objectives = objectives;
        self
    }
}

#[derive(Default)]
struct SummaryCore {
    samples: Vec<f64>,
    sum: f64,
}

/// A summary reporting count, sum and the configured quantiles
#[derive(Clone)]
pub struct Summary {
    desc: Desc,
    objectives: Vec<f64>,
    core: Arc<Mutex<SummaryCore>>,
}

impl Summary {
    pub fn with_opts(opts: SummaryOpts) -> prometheus::Result<Self> {
        let mut objectives = opts.objectives;
        if let Some(bad) = objectives.iter().find(|q| !(0.0..=1.0).contains(*q)) {
            return Err(prometheus::Error::Msg(format!(
                "summary objective {} out of range [0, 1]",
                bad
            )));
        }
        objectives.sort_by(f64::total_cmp);
        objectives.dedup();

        Ok(Self {
            desc: opts.common_opts.describe()?,
            objectives,
            core: Arc::new(Mutex::new(SummaryCore::default())),
        })
    }

    pub fn observe(&self, value: f64) {
        let mut core = self.lock();
        core.samples.push(value);
        core.sum += value;
    }

    pub fn get_sample_count(&self) -> u64 {
        self.lock().samples.len() as u64
    }

    pub fn get_sample_sum(&self) -> f64 {
        self.lock().sum
    }

    /// Nearest-rank quantile over everything observed so far, NaN when empty
    pub fn quantile(&self, q: f64) -> f64 {
        let mut sorted = self.lock().samples.clone();
        sorted.sort_by(f64::total_cmp);
        nearest_rank(&sorted, q)
    }

    fn lock(&self) -> MutexGuard<'_, SummaryCore> {
        self.core.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn nearest_rank(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (q * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

impl Collector for Summary {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.desc]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let (mut sorted, sum) = {
            let core = self.lock();
            (core.samples.clone(), core.sum)
        };
        sorted.sort_by(f64::total_cmp);

        let quantiles: Vec<proto::Quantile> = self
            .objectives
            .iter()
            .map(|&q| {
                let mut quantile = proto::Quantile::default();
                quantile.set_quantile(q);
                quantile.set_value(nearest_rank(&sorted, q));
                quantile
            })
            .collect();

        let mut summary = proto::Summary::default();
        summary.set_sample_count(sorted.len() as u64);
        summary.set_sample_sum(sum);
        summary.set_quantile(quantiles.into());

        let mut metric = proto::Metric::default();
        metric.set_label(self.desc.const_label_pairs.clone().into());
        metric.set_summary(summary);

        let mut family = MetricFamily::default();
        family.set_name(self.desc.fq_name.clone());
        family.set_help(self.desc.help.clone());
        family.set_field_type(MetricType::SUMMARY);
        family.set_metric(vec![metric].into());
        vec![family]
    }
}
