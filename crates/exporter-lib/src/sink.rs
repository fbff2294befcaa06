//! Metric sink
//!
//! Collectors write constant gauge samples into a `MetricSink`, which turns
//! them into Prometheus metric families for the text encoder. A sink only
//! accepts samples for descriptors its collector described, with exactly the
//! declared number of label values.

use prometheus::proto::{Gauge, LabelPair, Metric, MetricFamily, MetricType};
use std::collections::BTreeMap;
use tracing::warn;

/// Fixed description of a gauge: name, help text and ordered label keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeDesc {
    name: String,
    help: String,
    labels: Vec<String>,
}

impl GaugeDesc {
    pub fn new(name: &str, help: &str, labels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Same descriptor with extra label keys appended after the existing ones.
    pub fn with_trailing_labels(name: &str, help: &str, base: &[&str], extra: &[&str]) -> Self {
        let labels: Vec<&str> = base.iter().chain(extra).copied().collect();
        Self::new(name, help, &labels)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

struct Family {
    desc: GaugeDesc,
    metrics: Vec<Metric>,
}

/// Per-collector, per-scrape sample buffer.
pub struct MetricSink {
    collector: &'static str,
    families: BTreeMap<String, Family>,
    accepted: usize,
    rejected: usize,
}

impl MetricSink {
    pub fn new<'a>(collector: &'static str, descs: impl IntoIterator<Item = &'a GaugeDesc>) -> Self {
        let families = descs
            .into_iter()
            .map(|desc| {
                (
                    desc.name.clone(),
                    Family {
                        desc: desc.clone(),
                        metrics: Vec::new(),
                    },
                )
            })
            .collect();

        Self {
            collector,
            families,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Record one gauge sample. Label values must line up with the
    /// descriptor's label keys.
    pub fn gauge<S: AsRef<str>>(&mut self, desc: &GaugeDesc, value: f64, labels: &[S]) {
        let Some(family) = self.families.get_mut(&desc.name) else {
            warn!(
                collector = self.collector,
                metric = %desc.name,
                "Rejected sample for undescribed metric"
            );
            self.rejected += 1;
            return;
        };

        if labels.len() != family.desc.labels.len() {
            warn!(
                collector = self.collector,
                metric = %desc.name,
                expected = family.desc.labels.len(),
                got = labels.len(),
                "Rejected sample with wrong label count"
            );
            self.rejected += 1;
            return;
        }

        let mut metric = Metric::default();
        for (key, value) in family.desc.labels.iter().zip(labels) {
            let mut pair = LabelPair::default();
            pair.set_name(key.clone());
            pair.set_value(value.as_ref().to_string());
            metric.mut_label().push(pair);
        }

        let mut gauge = Gauge::default();
        gauge.set_value(value);
        metric.set_gauge(gauge);

        family.metrics.push(metric);
        self.accepted += 1;
    }

    /// Samples accepted so far
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Samples rejected so far
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Families with at least one sample, ordered by metric name.
    pub fn finish(self) -> Vec<MetricFamily> {
        self.families
            .into_values()
            .filter(|family| !family.metrics.is_empty())
            .map(|family| {
                let mut mf = MetricFamily::default();
                mf.set_name(family.desc.name);
                mf.set_help(family.desc.help);
                mf.set_field_type(MetricType::GAUGE);
                for metric in family.metrics {
                    mf.mut_metric().push(metric);
                }
                mf
            })
            .collect()
    }
}
