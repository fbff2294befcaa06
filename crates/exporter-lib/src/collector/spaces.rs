use super::{async_trait, Collector, CollectorContext};
use crate::error::{ExporterError, Result};
use crate::models::Region;
use crate::sink::{GaugeDesc, MetricSink};
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region as SigningRegion};
use aws_sdk_s3::{Client, Config as S3Config};
use std::error::Error as StdError;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

const LABELS: &[&str] = &["region", "name"];

/// Spaces accepts any SigV4 region; the endpoint selects the datacenter.
const SIGNING_REGION: &str = "us-east-1";

/// A bucket as reported by a region's object storage endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    /// Unix seconds
    pub creation_date: Option<i64>,
}

/// Lists the buckets of one region.
#[async_trait]
pub trait BucketLister: Send + Sync {
    async fn list_buckets(&self, region: &str) -> Result<Vec<Bucket>>;
}

/// S3-compatible Spaces client, one endpoint per region.
#[derive(Clone)]
pub struct SpacesClient {
    access_key_id: String,
    secret_access_key: String,
}

impl SpacesClient {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    fn endpoint(region: &str) -> String {
        format!("https://{}.digitaloceanspaces.com", region)
    }

    /// Client config for one region, making a single attempt per request.
    fn config_for(&self, region: &str) -> S3Config {
        let credentials = Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            None,
            None,
            "digitalocean-exporter",
        );

        S3Config::builder()
            .credentials_provider(credentials)
            .region(SigningRegion::new(SIGNING_REGION))
            .endpoint_url(Self::endpoint(region))
            .retry_config(RetryConfig::disabled())
            .behavior_version(BehaviorVersion::latest())
            .build()
    }

    fn client_for(&self, region: &str) -> Client {
        Client::from_conf(self.config_for(region))
    }
}

#[async_trait]
impl BucketLister for SpacesClient {
    async fn list_buckets(&self, region: &str) -> Result<Vec<Bucket>> {
        let response = self
            .client_for(region)
            .list_buckets()
            .send()
            .await
            .map_err(|e| classify(region, &e))?;

        Ok(response
            .buckets()
            .iter()
            .map(|bucket| Bucket {
                name: bucket.name().unwrap_or_default().to_string(),
                creation_date: bucket.creation_date().map(|date| date.secs()),
            })
            .collect())
    }
}

/// Map a storage error onto `NameResolution` when any error in its source
/// chain is a DNS lookup failure, `Storage` otherwise.
fn classify(region: &str, err: &(dyn StdError + 'static)) -> ExporterError {
    let mut current = Some(err);
    while let Some(e) = current {
        let message = e.to_string();
        if is_dns_failure(&message) {
            return ExporterError::NameResolution {
                host: SpacesClient::endpoint(region),
                message,
            };
        }
        current = e.source();
    }

    ExporterError::Storage(format!("{}: {}", region, chain_message(err)))
}

fn is_dns_failure(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("dns error") || message.contains("failed to lookup address")
}

fn chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        parts.push(e.to_string());
        current = e.source();
    }
    parts.join(": ")
}

/// Collects Spaces buckets across every region, querying regions
/// concurrently.
pub struct SpacesCollector {
    ctx: CollectorContext,
    lister: Arc<dyn BucketLister>,
    bucket: GaugeDesc,
    bucket_created: GaugeDesc,
}

impl SpacesCollector {
    pub fn new(ctx: CollectorContext, lister: Arc<dyn BucketLister>) -> Self {
        ctx.errors.init("spaces_bucket");

        Self {
            ctx,
            lister,
            bucket: GaugeDesc::new(
                "digitalocean_spaces_bucket",
                "Spaces bucket and its details. Will always be 1 if exists",
                LABELS,
            ),
            bucket_created: GaugeDesc::new(
                "digitalocean_spaces_bucket_created",
                "Spaces bucket's creation date in unix epoch format",
                LABELS,
            ),
        }
    }

    fn emit_buckets(&self, region: &str, buckets: &[Bucket], sink: &mut MetricSink) {
        for bucket in buckets {
            let labels = [region, bucket.name.as_str()];
            sink.gauge(&self.bucket, 1.0, &labels);
            if let Some(created) = bucket.creation_date {
                sink.gauge(&self.bucket_created, created as f64, &labels);
            }
        }
    }
}

#[async_trait]
impl Collector for SpacesCollector {
    fn name(&self) -> &'static str {
        "spaces_bucket"
    }

    fn describe(&self) -> Vec<&GaugeDesc> {
        vec![&self.bucket, &self.bucket_created]
    }

    async fn collect(&self, sink: &mut MetricSink) {
        let regions = self
            .ctx
            .client
            .list_all::<Region>(self.ctx.deadline())
            .await;
        if let Some(e) = &regions.error {
            self.ctx.record_failure(self.name(), "can't list regions", e);
        }

        let mut tasks = JoinSet::new();
        for region in regions.items {
            let lister = Arc::clone(&self.lister);
            let timeout = self.ctx.timeout;
            tasks.spawn(async move {
                let result = tokio::time::timeout(timeout, lister.list_buckets(&region.slug))
                    .await
                    .unwrap_or(Err(ExporterError::Timeout));
                (region.slug, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((region, Ok(buckets))) => self.emit_buckets(&region, &buckets, sink),
                Ok((region, Err(ExporterError::NameResolution { host, .. }))) => {
                    debug!(region = %region, host = %host, "Spaces not available in region");
                }
                Ok((region, Err(e))) => {
                    self.ctx.record_failure(
                        self.name(),
                        &format!("can't list spaces buckets in {}", region),
                        &e,
                    );
                }
                Err(e) => {
                    let err = ExporterError::Storage(format!("bucket listing task failed: {}", e));
                    self.ctx
                        .record_failure(self.name(), "can't list spaces buckets", &err);
                }
            }
        }
    }
}
