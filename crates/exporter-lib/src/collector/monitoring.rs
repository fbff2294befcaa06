use super::{async_trait, Collector, CollectorContext};
use crate::client::MetricQuery;
use crate::models::{Droplet, SampleStream};
use crate::sink::{GaugeDesc, MetricSink};
use chrono::{Duration as ChronoDuration, Utc};
use tracing::debug;

const LABELS: &[&str] = &["id", "name", "region"];
const CPU_LABELS: &[&str] = &["mode"];
const FILESYSTEM_LABELS: &[&str] = &["device", "fstype", "mountpoint"];
const BANDWIDTH_LABELS: &[&str] = &["interface", "direction"];

/// Trailing window every monitoring query covers
const WINDOW_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy)]
enum Series {
    Cpu,
    MemoryTotal,
    MemoryFree,
    MemoryAvailable,
    MemoryCached,
    FilesystemFree,
    FilesystemSize,
    Bandwidth,
}

/// One monitoring query issued per droplet.
struct SeriesQuery {
    series: Series,
    metric: &'static str,
    params: &'static [(&'static str, &'static str)],
    what: &'static str,
}

const QUERIES: &[SeriesQuery] = &[
    SeriesQuery {
        series: Series::Cpu,
        metric: "cpu",
        params: &[],
        what: "CPU",
    },
    SeriesQuery {
        series: Series::MemoryTotal,
        metric: "memory_total",
        params: &[],
        what: "total memory",
    },
    SeriesQuery {
        series: Series::MemoryAvailable,
        metric: "memory_available",
        params: &[],
        what: "available memory",
    },
    SeriesQuery {
        series: Series::MemoryFree,
        metric: "memory_free",
        params: &[],
        what: "free memory",
    },
    SeriesQuery {
        series: Series::MemoryCached,
        metric: "memory_cached",
        params: &[],
        what: "cached memory",
    },
    SeriesQuery {
        series: Series::FilesystemFree,
        metric: "filesystem_free",
        params: &[],
        what: "filesystem free",
    },
    SeriesQuery {
        series: Series::FilesystemSize,
        metric: "filesystem_size",
        params: &[],
        what: "filesystem size",
    },
    SeriesQuery {
        series: Series::Bandwidth,
        metric: "bandwidth",
        params: &[("interface", "public"), ("direction", "inbound")],
        what: "bandwidth public inbound",
    },
    SeriesQuery {
        series: Series::Bandwidth,
        metric: "bandwidth",
        params: &[("interface", "public"), ("direction", "outbound")],
        what: "bandwidth public outbound",
    },
    SeriesQuery {
        series: Series::Bandwidth,
        metric: "bandwidth",
        params: &[("interface", "private"), ("direction", "inbound")],
        what: "bandwidth private inbound",
    },
    SeriesQuery {
        series: Series::Bandwidth,
        metric: "bandwidth",
        params: &[("interface", "private"), ("direction", "outbound")],
        what: "bandwidth private outbound",
    },
];

/// Collects the latest droplet monitoring samples: CPU, memory, filesystem
/// and bandwidth.
pub struct MonitoringCollector {
    ctx: CollectorContext,
    cpu: GaugeDesc,
    memory_total: GaugeDesc,
    memory_free: GaugeDesc,
    memory_available: GaugeDesc,
    memory_cached: GaugeDesc,
    filesystem_free: GaugeDesc,
    filesystem_size: GaugeDesc,
    bandwidth: GaugeDesc,
}

impl MonitoringCollector {
    pub fn new(ctx: CollectorContext) -> Self {
        ctx.errors.init("monitoring");

        Self {
            ctx,
            cpu: GaugeDesc::with_trailing_labels(
                "digitalocean_monitoring_cpu",
                "Droplet's CPU metrics in seconds",
                LABELS,
                CPU_LABELS,
            ),
            memory_total: GaugeDesc::new(
                "digitalocean_monitoring_memory_total",
                "Droplet's total memory metrics in bytes",
                LABELS,
            ),
            memory_free: GaugeDesc::new(
                "digitalocean_monitoring_memory_free",
                "Droplet's free memory metrics in bytes",
                LABELS,
            ),
            memory_available: GaugeDesc::new(
                "digitalocean_monitoring_memory_available",
                "Droplet's available memory metrics in bytes",
                LABELS,
            ),
            memory_cached: GaugeDesc::new(
                "digitalocean_monitoring_memory_cached",
                "Droplet's cached memory metrics in bytes",
                LABELS,
            ),
            filesystem_free: GaugeDesc::with_trailing_labels(
                "digitalocean_monitoring_filesystem_free",
                "Droplet's filesystem free metrics in bytes",
                LABELS,
                FILESYSTEM_LABELS,
            ),
            filesystem_size: GaugeDesc::with_trailing_labels(
                "digitalocean_monitoring_filesystem_size",
                "Droplet's filesystem size metrics in bytes",
                LABELS,
                FILESYSTEM_LABELS,
            ),
            bandwidth: GaugeDesc::with_trailing_labels(
                "digitalocean_monitoring_bandwidth",
                "Droplet's bandwidth metrics in megabits per second",
                LABELS,
                BANDWIDTH_LABELS,
            ),
        }
    }

    fn desc(&self, series: Series) -> (&GaugeDesc, &'static [&'static str]) {
        match series {
            Series::Cpu => (&self.cpu, CPU_LABELS),
            Series::MemoryTotal => (&self.memory_total, &[]),
            Series::MemoryFree => (&self.memory_free, &[]),
            Series::MemoryAvailable => (&self.memory_available, &[]),
            Series::MemoryCached => (&self.memory_cached, &[]),
            Series::FilesystemFree => (&self.filesystem_free, FILESYSTEM_LABELS),
            Series::FilesystemSize => (&self.filesystem_size, FILESYSTEM_LABELS),
            Series::Bandwidth => (&self.bandwidth, BANDWIDTH_LABELS),
        }
    }

    async fn collect_droplet(&self, droplet: &Droplet, start: i64, end: i64, sink: &mut MetricSink) {
        let base = [
            droplet.id.to_string(),
            droplet.name.clone(),
            droplet.region.slug.clone(),
        ];

        for query in QUERIES {
            let request = MetricQuery {
                metric: query.metric,
                host_id: droplet.id.to_string(),
                start,
                end,
                params: query.params,
            };

            let response = match self
                .ctx
                .bounded(self.ctx.client.droplet_metrics(&request))
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    self.ctx.record_failure(
                        self.name(),
                        &format!("can't read current droplet {} metrics", query.what),
                        &e,
                    );
                    continue;
                }
            };

            let (desc, trailing) = self.desc(query.series);
            for stream in &response.data.result {
                self.emit_series(desc, &base, trailing, query, stream, sink);
            }
        }
    }

    fn emit_series(
        &self,
        desc: &GaugeDesc,
        base: &[String],
        trailing: &[&str],
        query: &SeriesQuery,
        stream: &SampleStream,
        sink: &mut MetricSink,
    ) {
        let Some(raw) = stream.last_value() else {
            debug!(metric = desc.name(), "Skipping series without samples");
            return;
        };

        let mut labels = base.to_vec();
        for key in trailing {
            // bandwidth series may omit the selectors they were queried with
            let value = match stream.label(key) {
                "" => query
                    .params
                    .iter()
                    .find(|(param, _)| param == key)
                    .map(|(_, value)| *value)
                    .unwrap_or(""),
                value => value,
            };
            labels.push(value.to_string());
        }

        let value = self.ctx.parse_or_sentinel(self.name(), desc.name(), raw);
        sink.gauge(desc, value, &labels);
    }
}

#[async_trait]
impl Collector for MonitoringCollector {
    fn name(&self) -> &'static str {
        "monitoring"
    }

    fn describe(&self) -> Vec<&GaugeDesc> {
        vec![
            &self.cpu,
            &self.memory_total,
            &self.memory_free,
            &self.memory_available,
            &self.memory_cached,
            &self.filesystem_free,
            &self.filesystem_size,
            &self.bandwidth,
        ]
    }

    async fn collect(&self, sink: &mut MetricSink) {
        let droplets = self
            .ctx
            .client
            .list_all::<Droplet>(self.ctx.deadline())
            .await;
        if let Some(e) = &droplets.error {
            self.ctx.record_failure(self.name(), "can't list droplets", e);
        }

        let end = Utc::now();
        let start = end - ChronoDuration::minutes(WINDOW_MINUTES);

        for droplet in &droplets.items {
            self.collect_droplet(droplet, start.timestamp(), end.timestamp(), sink)
                .await;
        }
    }
}
