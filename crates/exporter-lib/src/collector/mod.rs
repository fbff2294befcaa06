//! Per-resource collectors
//!
//! Every collector owns a fixed set of gauge descriptors and, on each scrape,
//! fetches its resources, projects them onto label tuples and writes
//! constant samples into a `MetricSink`. Failures are logged and counted on
//! the shared `ErrorCounter`; they never fail the scrape.

mod account;
mod app;
mod balance;
mod database;
mod domain;
mod droplet;
mod exporter;
mod floating_ip;
mod image;
mod incidents;
mod key;
mod kubernetes;
mod load_balancer;
mod monitoring;
mod snapshot;
mod spaces;
mod table;
mod volume;

#[cfg(test)]
mod tests;

pub use account::AccountCollector;
pub use app::AppCollector;
pub use balance::BalanceCollector;
pub use database::DatabaseCollector;
pub use domain::DomainCollector;
pub use droplet::DropletCollector;
pub use exporter::{BuildInfo, ExporterCollector};
pub use floating_ip::FloatingIpCollector;
pub use image::ImageCollector;
pub use incidents::{parse_region, IncidentCollector, STATUS_PAGE_URL};
pub use key::KeyCollector;
pub use kubernetes::KubernetesCollector;
pub use load_balancer::LoadBalancerCollector;
pub use monitoring::MonitoringCollector;
pub use snapshot::SnapshotCollector;
pub use spaces::{Bucket, BucketLister, SpacesClient, SpacesCollector};
pub use table::{ListingCollector, ResourceTable};
pub use volume::VolumeCollector;

use crate::client::DigitalOceanClient;
use crate::error::{ExporterError, Result};
use crate::observability::ErrorCounter;
use crate::sink::{GaugeDesc, MetricSink};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

pub use async_trait::async_trait;

/// Bytes in a MiB, for sizes the API reports in binary megabytes
pub(crate) const MIB: f64 = 1024.0 * 1024.0;
/// Bytes in a GiB, for sizes the API reports in binary gigabytes
pub(crate) const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
/// Bytes in a GB, for sizes the API reports in decimal gigabytes
pub(crate) const GB: f64 = 1000.0 * 1000.0 * 1000.0;

/// Trait for per-resource metric collectors
#[async_trait]
pub trait Collector: Send + Sync {
    /// Collector label on `digitalocean_errors_total` and in logs
    fn name(&self) -> &'static str;

    /// Every descriptor this collector may ever emit
    fn describe(&self) -> Vec<&GaugeDesc>;

    /// Fetch the current state and write samples into `sink`
    async fn collect(&self, sink: &mut MetricSink);
}

/// Dependencies shared by all collectors
#[derive(Clone)]
pub struct CollectorContext {
    pub client: Arc<DigitalOceanClient>,
    pub errors: ErrorCounter,
    pub timeout: Duration,
}

impl CollectorContext {
    pub fn new(client: Arc<DigitalOceanClient>, errors: ErrorCounter, timeout: Duration) -> Self {
        Self {
            client,
            errors,
            timeout,
        }
    }

    /// Deadline for a collect cycle starting now
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.timeout
    }

    /// Run a single upstream call bounded by the configured timeout.
    pub async fn bounded<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ExporterError::Timeout)?
    }

    /// Count and log a collector-local failure.
    pub fn record_failure(&self, collector: &str, what: &str, err: &ExporterError) {
        self.errors.inc(collector);
        warn!(collector = collector, error = %err, "{}", what);
    }

    /// Parse a decimal string field, substituting -1 and counting the error
    /// when it does not parse.
    pub fn parse_or_sentinel(&self, collector: &str, field: &str, raw: &str) -> f64 {
        match raw.trim().parse::<f64>() {
            Ok(value) => value,
            Err(source) => {
                let err = ExporterError::ParseFloat {
                    field: field.to_string(),
                    source,
                };
                self.record_failure(collector, &format!("can't parse {}", field), &err);
                -1.0
            }
        }
    }
}

/// 1.0 when `value` equals `sentinel` ignoring ASCII case, else 0.0
pub fn status_gauge(value: &str, sentinel: &str) -> f64 {
    if value.eq_ignore_ascii_case(sentinel) {
        1.0
    } else {
        0.0
    }
}

pub fn bool_gauge(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
