use super::{async_trait, Collector, CollectorContext};
use crate::client::Endpoint;
use crate::models::{Domain, DomainRecord};
use crate::sink::{GaugeDesc, MetricSink};

const RECORD_LABELS: &[&str] = &["id", "name", "type", "data"];

/// Collects domain TTLs and the numeric fields of every domain record.
pub struct DomainCollector {
    ctx: CollectorContext,
    record_port: GaugeDesc,
    record_priority: GaugeDesc,
    record_weight: GaugeDesc,
    ttl: GaugeDesc,
}

impl DomainCollector {
    pub fn new(ctx: CollectorContext) -> Self {
        ctx.errors.init("domain");

        Self {
            ctx,
            record_port: GaugeDesc::new(
                "digitalocean_domain_record_port",
                "The port for SRV records",
                RECORD_LABELS,
            ),
            record_priority: GaugeDesc::new(
                "digitalocean_domain_record_priority",
                "The priority for SRV and MX records",
                RECORD_LABELS,
            ),
            record_weight: GaugeDesc::new(
                "digitalocean_domain_record_weight",
                "The weight for SRV records",
                RECORD_LABELS,
            ),
            ttl: GaugeDesc::new(
                "digitalocean_domain_ttl_seconds",
                "Seconds that clients can cache queried information before a refresh should be requested",
                &["name"],
            ),
        }
    }

    fn emit_record(&self, record: &DomainRecord, sink: &mut MetricSink) {
        let id = record.id.to_string();
        let labels = [
            id.as_str(),
            record.name.as_str(),
            record.kind.as_str(),
            record.data.as_str(),
        ];

        // null in the API means the field does not apply to the record type
        sink.gauge(&self.record_port, record.port.unwrap_or(0) as f64, &labels);
        sink.gauge(
            &self.record_priority,
            record.priority.unwrap_or(0) as f64,
            &labels,
        );
        sink.gauge(&self.record_weight, record.weight.unwrap_or(0) as f64, &labels);
    }
}

#[async_trait]
impl Collector for DomainCollector {
    fn name(&self) -> &'static str {
        "domain"
    }

    fn describe(&self) -> Vec<&GaugeDesc> {
        vec![
            &self.record_port,
            &self.record_priority,
            &self.record_weight,
            &self.ttl,
        ]
    }

    async fn collect(&self, sink: &mut MetricSink) {
        let deadline = self.ctx.deadline();
        let domains = self.ctx.client.list_all::<Domain>(deadline).await;
        if let Some(e) = &domains.error {
            self.ctx.record_failure(self.name(), "can't list domains", e);
        }

        for domain in &domains.items {
            sink.gauge(&self.ttl, domain.ttl as f64, &[domain.name.as_str()]);

            let endpoint = Endpoint::new(
                format!("v2/domains/{}/records", domain.name),
                "domain_records",
            );
            let records = self
                .ctx
                .client
                .list_all_at::<DomainRecord>(&endpoint, deadline)
                .await;
            if let Some(e) = &records.error {
                self.ctx.record_failure(
                    self.name(),
                    &format!("can't list records of domain {}", domain.name),
                    e,
                );
            }

            for record in &records.items {
                self.emit_record(record, sink);
            }
        }
    }
}
