//! DigitalOcean exporter library
//!
//! This crate provides:
//! - A paginating DigitalOcean API client
//! - Per-resource collectors mapping API objects onto gauges
//! - The collector registry and text exposition
//! - The HTTP scrape surface and observability helpers

pub mod api;
pub mod client;
pub mod collector;
pub mod error;
pub mod models;
pub mod observability;
pub mod registry;
pub mod sink;

pub use client::DigitalOceanClient;
pub use collector::{Collector, CollectorContext};
pub use error::{ExporterError, Result};
pub use observability::{ErrorCounter, StructuredLogger};
pub use registry::CollectorRegistry;
