//! Collector registry
//!
//! Owns the registered collectors plus a `prometheus::Registry` for the
//! shared error counter. Every scrape runs the collectors in registration
//! order and merges their families with the registry's own.

use crate::collector::Collector;
use crate::error::{ExporterError, Result};
use crate::observability::{ErrorCounter, StructuredLogger};
use crate::sink::MetricSink;
use prometheus::core::Desc;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, Registry, TextEncoder};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub struct CollectorRegistry {
    collectors: Vec<Arc<dyn Collector>>,
    names: HashSet<String>,
    registry: Registry,
    logger: Option<StructuredLogger>,
}

impl CollectorRegistry {
    pub fn new(errors: &ErrorCounter) -> Result<Self> {
        let registry = Registry::new();
        errors.register(&registry)?;

        Ok(Self {
            collectors: Vec::new(),
            names: HashSet::from(["digitalocean_errors_total".to_string()]),
            registry,
            logger: None,
        })
    }

    /// Report every scrape through `logger`.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Add a collector after checking its descriptors are valid and do not
    /// clash with any metric already registered.
    pub fn register(&mut self, collector: Arc<dyn Collector>) -> Result<()> {
        let mut names = Vec::new();
        for desc in collector.describe() {
            Desc::new(
                desc.name().to_string(),
                desc.help().to_string(),
                desc.labels().to_vec(),
                HashMap::new(),
            )?;

            if self.names.contains(desc.name()) || names.contains(&desc.name()) {
                return Err(ExporterError::DuplicateDescriptor(desc.name().to_string()));
            }
            names.push(desc.name());
        }

        let names: Vec<String> = names.into_iter().map(str::to_string).collect();
        debug!(
            collector = collector.name(),
            metrics = names.len(),
            "Registered collector"
        );
        self.names.extend(names);
        self.collectors.push(collector);
        Ok(())
    }

    pub fn collector_names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// Run every collector and return all families sorted by name.
    pub async fn gather(&self) -> Vec<MetricFamily> {
        let started = Instant::now();
        let mut families = Vec::new();
        let mut rejected = 0;

        for collector in &self.collectors {
            let mut sink = MetricSink::new(collector.name(), collector.describe());
            collector.collect(&mut sink).await;
            rejected += sink.rejected();
            families.extend(sink.finish());
        }

        families.extend(self.registry.gather());
        families.sort_by(|a, b| a.get_name().cmp(b.get_name()));

        let duration_ms = started.elapsed().as_millis() as u64;
        match &self.logger {
            Some(logger) => logger.log_scrape_completed(
                self.collectors.len(),
                families.len(),
                rejected,
                duration_ms,
            ),
            None => debug!(
                families = families.len(),
                duration_ms = duration_ms,
                "Scrape completed"
            ),
        }

        families
    }

    /// Scrape and encode in the Prometheus text format.
    pub async fn render(&self) -> Result<String> {
        let families = self.gather().await;
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
