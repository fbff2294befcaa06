//! Observability infrastructure for the exporter
//!
//! Provides:
//! - The shared per-collector error counter (`digitalocean_errors_total`)
//! - Structured JSON lifecycle logging with tracing

use crate::error::Result;
use prometheus::{IntCounterVec, Opts, Registry};
use tracing::{info, warn};

/// Counts upstream failures per collector.
///
/// Cheap to clone; every clone increments the same atomic counters, so the
/// spaces fan-out and the sequential collectors can share it.
#[derive(Clone)]
pub struct ErrorCounter {
    errors: IntCounterVec,
}

impl ErrorCounter {
    pub fn new() -> Result<Self> {
        let errors = IntCounterVec::new(
            Opts::new(
                "digitalocean_errors_total",
                "The total number of errors per collector",
            ),
            &["collector"],
        )?;
        Ok(Self { errors })
    }

    /// Register the counter vector so it is gathered with every scrape.
    pub fn register(&self, registry: &Registry) -> Result<()> {
        registry.register(Box::new(self.errors.clone()))?;
        Ok(())
    }

    /// Expose the collector's series at 0 before its first failure.
    pub fn init(&self, collector: &str) {
        self.errors.with_label_values(&[collector]).inc_by(0);
    }

    pub fn inc(&self, collector: &str) {
        self.errors.with_label_values(&[collector]).inc();
    }

    pub fn get(&self, collector: &str) -> u64 {
        self.errors.with_label_values(&[collector]).get()
    }
}

/// Structured logger for exporter lifecycle events
#[derive(Clone)]
pub struct StructuredLogger {
    listen_addr: String,
}

impl StructuredLogger {
    pub fn new(listen_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
        }
    }

    /// Log exporter startup
    pub fn log_startup(&self, version: &str, metrics_path: &str, timeout_ms: u64) {
        info!(
            event = "exporter_started",
            listen_addr = %self.listen_addr,
            exporter_version = %version,
            metrics_path = %metrics_path,
            timeout_ms = timeout_ms,
            "DigitalOcean exporter started"
        );
    }

    pub fn log_collectors_registered(&self, collectors: &[&str]) {
        info!(
            event = "collectors_registered",
            listen_addr = %self.listen_addr,
            count = collectors.len(),
            collectors = ?collectors,
            "Registered collectors"
        );
    }

    /// Spaces credentials are optional; without them bucket metrics are off.
    pub fn log_spaces_disabled(&self) {
        warn!(
            event = "spaces_disabled",
            listen_addr = %self.listen_addr,
            "Spaces access key and secret not set, bucket metrics are disabled"
        );
    }

    pub fn log_scrape_completed(
        &self,
        collectors: usize,
        families: usize,
        rejected: usize,
        duration_ms: u64,
    ) {
        info!(
            event = "scrape_completed",
            listen_addr = %self.listen_addr,
            collectors = collectors,
            families = families,
            rejected = rejected,
            duration_ms = duration_ms,
            "Scrape completed"
        );
    }

    /// Log exporter shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "exporter_shutdown",
            listen_addr = %self.listen_addr,
            reason = %reason,
            "DigitalOcean exporter shutting down"
        );
    }
}
