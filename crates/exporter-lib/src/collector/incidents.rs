use super::{async_trait, Collector, CollectorContext};
use crate::error::{ExporterError, Result};
use crate::sink::{GaugeDesc, MetricSink};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Public status page summary for DigitalOcean services
pub const STATUS_PAGE_URL: &str = "https://s2k7tnzlhrpw.statuspage.io/api/v2/summary.json";

const UNSPECIFIED: &str = "unspecified";

/// Datacenter codes such as NYC1 or SFO3
static REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{3}[0-9]").expect("region pattern is valid"));

#[derive(Debug, Default, Deserialize)]
struct StatusSummary {
    #[serde(default)]
    incidents: Vec<Incident>,
}

#[derive(Debug, Deserialize)]
struct Incident {
    #[serde(default)]
    name: String,
}

/// Extract the lowercase datacenter code from an incident title, or
/// `unspecified` when the title does not name one.
pub fn parse_region(title: &str) -> String {
    REGION
        .find(title)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_else(|| UNSPECIFIED.to_string())
}

/// Counts active incidents on the public status page, per region.
pub struct IncidentCollector {
    ctx: CollectorContext,
    http: reqwest::Client,
    url: String,
    incidents: GaugeDesc,
    total: GaugeDesc,
}

impl IncidentCollector {
    pub fn new(ctx: CollectorContext) -> Result<Self> {
        Self::with_url(ctx, STATUS_PAGE_URL)
    }

    pub fn with_url(ctx: CollectorContext, url: impl Into<String>) -> Result<Self> {
        ctx.errors.init("incidents");
        let http = reqwest::Client::builder().timeout(ctx.timeout).build()?;

        Ok(Self {
            ctx,
            http,
            url: url.into(),
            incidents: GaugeDesc::new(
                "digitalocean_incidents",
                "Number of regional active incidents at digitalocean",
                &["region"],
            ),
            total: GaugeDesc::new(
                "digitalocean_incidents_total",
                "Number of total active incidents at digitalocean",
                &[],
            ),
        })
    }

    async fn fetch(&self) -> Result<StatusSummary> {
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExporterError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Collector for IncidentCollector {
    fn name(&self) -> &'static str {
        "incidents"
    }

    fn describe(&self) -> Vec<&GaugeDesc> {
        vec![&self.incidents, &self.total]
    }

    async fn collect(&self, sink: &mut MetricSink) {
        let summary = match self.fetch().await {
            Ok(summary) => summary,
            Err(e) => {
                self.ctx
                    .record_failure(self.name(), "can't retrieve incidents", &e);
                StatusSummary::default()
            }
        };

        let mut per_region: BTreeMap<String, u64> = BTreeMap::new();
        for incident in &summary.incidents {
            *per_region.entry(parse_region(&incident.name)).or_insert(0) += 1;
        }

        for (region, count) in &per_region {
            sink.gauge(&self.incidents, *count as f64, &[region.as_str()]);
        }

        let none: &[&str] = &[];
        sink.gauge(&self.total, summary.incidents.len() as f64, none);
    }
}
