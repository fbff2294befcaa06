use super::{async_trait, Collector};
use crate::sink::{GaugeDesc, MetricSink};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Version metadata baked in at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub revision: String,
    pub builddate: String,
}

impl BuildInfo {
    /// Package version plus `BUILD_REVISION` / `BUILD_DATE` from the build
    /// environment, `unknown` when unset.
    pub fn from_env() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            revision: option_env!("BUILD_REVISION").unwrap_or("unknown").to_string(),
            builddate: option_env!("BUILD_DATE").unwrap_or("unknown").to_string(),
        }
    }
}

/// Metrics about the exporter process itself.
pub struct ExporterCollector {
    build: BuildInfo,
    started_at: DateTime<Utc>,
    start_time: GaugeDesc,
    build_info: GaugeDesc,
}

impl ExporterCollector {
    pub fn new(build: BuildInfo, started_at: DateTime<Utc>) -> Self {
        Self {
            build,
            started_at,
            start_time: GaugeDesc::new(
                "digitalocean_start_time",
                "Unix timestamp of the start time",
                &[],
            ),
            build_info: GaugeDesc::new(
                "digitalocean_build_info",
                "A metric with a constant '1' value labeled by version, revision and build date from which the exporter was built",
                &["version", "revision", "builddate"],
            ),
        }
    }
}

#[async_trait]
impl Collector for ExporterCollector {
    fn name(&self) -> &'static str {
        "exporter"
    }

    fn describe(&self) -> Vec<&GaugeDesc> {
        vec![&self.start_time, &self.build_info]
    }

    async fn collect(&self, sink: &mut MetricSink) {
        debug!(
            version = %self.build.version,
            revision = %self.build.revision,
            builddate = %self.build.builddate,
            start_time = self.started_at.timestamp(),
            "Collecting exporter metrics"
        );

        let none: &[&str] = &[];
        sink.gauge(&self.start_time, self.started_at.timestamp() as f64, none);
        sink.gauge(
            &self.build_info,
            1.0,
            &[
                self.build.version.as_str(),
                self.build.revision.as_str(),
                self.build.builddate.as_str(),
            ],
        );
    }
}
