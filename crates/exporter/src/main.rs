//! DigitalOcean exporter
//!
//! Serves DigitalOcean account and resource state as Prometheus gauges.
//! Every scrape queries the API afresh; nothing is cached between scrapes.

use anyhow::Result;
use chrono::Utc;
use exporter_lib::{
    api::{self, AppState},
    collector::{
        AccountCollector, AppCollector, BalanceCollector, BuildInfo, Collector,
        DatabaseCollector, DomainCollector, DropletCollector, ExporterCollector,
        FloatingIpCollector, ImageCollector, IncidentCollector, KeyCollector,
        KubernetesCollector, LoadBalancerCollector, MonitoringCollector, SnapshotCollector,
        SpacesClient, SpacesCollector, VolumeCollector,
    },
    CollectorContext, CollectorRegistry, DigitalOceanClient, ErrorCounter, StructuredLogger,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

const EXPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let started_at = Utc::now();
    let config = config::ExporterConfig::load()?;

    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().json())
        .init();

    config.validate()?;

    let listen_addr = config.listen_addr();
    let logger = StructuredLogger::new(&listen_addr);
    logger.log_startup(EXPORTER_VERSION, &config.web_path, config.http_timeout);

    let registry = build_registry(&config, &logger, started_at)?;
    logger.log_collectors_registered(&registry.collector_names());

    let state = Arc::new(AppState::new(Arc::new(registry), config.web_path.clone()));

    let shutdown_logger = logger.clone();
    api::serve(&listen_addr, state, async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_logger.log_shutdown("SIGINT received");
        }
    })
    .await?;

    info!("Shutting down");
    Ok(())
}

/// Wire every collector onto one registry sharing a client and error counter.
fn build_registry(
    config: &config::ExporterConfig,
    logger: &StructuredLogger,
    started_at: chrono::DateTime<Utc>,
) -> Result<CollectorRegistry> {
    let token = config.token().unwrap_or_default();
    let client = Arc::new(DigitalOceanClient::new(
        token,
        &config.digitalocean_api_url,
        config.timeout(),
    )?);

    let errors = ErrorCounter::new()?;
    let ctx = CollectorContext::new(client, errors.clone(), config.timeout());
    let mut registry = CollectorRegistry::new(&errors)?.with_logger(logger.clone());

    let mut collectors: Vec<Arc<dyn Collector>> = vec![
        Arc::new(ExporterCollector::new(BuildInfo::from_env(), started_at)),
        Arc::new(AccountCollector::new(ctx.clone())),
        Arc::new(AppCollector::new(ctx.clone())),
        Arc::new(BalanceCollector::new(ctx.clone())),
        Arc::new(DatabaseCollector::new(ctx.clone())),
        Arc::new(DomainCollector::new(ctx.clone())),
        Arc::new(DropletCollector::new(ctx.clone())),
        Arc::new(FloatingIpCollector::new(ctx.clone())),
        Arc::new(ImageCollector::new(ctx.clone())),
        Arc::new(IncidentCollector::new(ctx.clone())?),
        Arc::new(KeyCollector::new(ctx.clone())),
        Arc::new(KubernetesCollector::new(ctx.clone())),
        Arc::new(LoadBalancerCollector::new(ctx.clone())),
        Arc::new(MonitoringCollector::new(ctx.clone())),
        Arc::new(SnapshotCollector::new(ctx.clone())),
        Arc::new(VolumeCollector::new(ctx.clone())),
    ];

    match config.spaces_credentials() {
        Some((key_id, secret)) => collectors.push(Arc::new(SpacesCollector::new(
            ctx,
            Arc::new(SpacesClient::new(key_id, secret)),
        ))),
        None => logger.log_spaces_disabled(),
    }

    for collector in collectors {
        registry.register(collector)?;
    }

    Ok(registry)
}
