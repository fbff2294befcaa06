//! DigitalOcean API client
//!
//! A thin authenticated wrapper over `reqwest` that lists paginated
//! collections and fetches single objects and monitoring series.

mod pagination;

pub use pagination::{drain_pages, ListOptions, Links, Page, Paged, Pages};

use crate::error::{ExporterError, Result};
use crate::models::{Account, Balance, MetricsResponse};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

/// Public API endpoint
pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com/";

const USER_AGENT: &str = concat!("digitalocean-exporter/", env!("CARGO_PKG_VERSION"));

/// A resource kind served by a paginated collection endpoint.
pub trait Listable: DeserializeOwned + Send + Sync + 'static {
    /// Path relative to the API base, e.g. `v2/droplets`
    const PATH: &'static str;
    /// JSON key holding the page's items
    const KEY: &'static str;
    /// Fixed query parameters sent with every page request
    const QUERY: &'static [(&'static str, &'static str)] = &[];
}

/// Location of a collection in the API.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub path: String,
    pub key: &'static str,
    pub query: &'static [(&'static str, &'static str)],
}

impl Endpoint {
    pub fn new(path: impl Into<String>, key: &'static str) -> Self {
        Self {
            path: path.into(),
            key,
            query: &[],
        }
    }

    pub fn of<T: Listable>() -> Self {
        Self {
            path: T::PATH.to_string(),
            key: T::KEY,
            query: T::QUERY,
        }
    }
}

/// Parameters of a droplet monitoring query.
#[derive(Debug, Clone)]
pub struct MetricQuery {
    /// Series name, e.g. `cpu` or `bandwidth`
    pub metric: &'static str,
    pub host_id: String,
    pub start: i64,
    pub end: i64,
    /// Extra series selectors such as `interface` and `direction`
    pub params: &'static [(&'static str, &'static str)],
}

#[derive(Deserialize)]
struct AccountEnvelope {
    account: Account,
}

/// Authenticated client for the DigitalOcean v2 API
#[derive(Debug, Clone)]
pub struct DigitalOceanClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl DigitalOceanClient {
    /// Create a client for `base_url` whose calls are each bounded by `timeout`.
    pub fn new(token: impl Into<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        // Url::join drops the last path segment unless the base ends in '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.base_url.join(path)?;
        debug!(url = %url, "Requesting DigitalOcean API");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExporterError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    /// Fetch a single page of a collection.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        options: &ListOptions,
    ) -> Result<Page<T>> {
        let mut query: Vec<(&str, String)> = endpoint
            .query
            .iter()
            .map(|(key, value)| (*key, value.to_string()))
            .collect();
        query.push(("page", options.page.to_string()));
        query.push(("per_page", options.per_page.to_string()));

        let mut body: Value = self.get(&endpoint.path, &query).await?;

        let items = match body.get_mut(endpoint.key).map(Value::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(items) => serde_json::from_value(items)?,
        };
        let links = match body.get_mut("links").map(Value::take) {
            None | Some(Value::Null) => None,
            Some(links) => Some(serde_json::from_value(links)?),
        };

        Ok(Page { items, links })
    }

    /// Drain every page of `T`'s collection before `deadline`.
    pub async fn list_all<T: Listable>(&self, deadline: Instant) -> Paged<T> {
        self.list_all_at(&Endpoint::of::<T>(), deadline).await
    }

    /// Drain every page of an arbitrary collection before `deadline`.
    pub async fn list_all_at<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        deadline: Instant,
    ) -> Paged<T> {
        drain_pages(deadline, move |options: ListOptions| async move {
            self.list_page(endpoint, &options).await
        })
        .await
    }

    pub async fn account(&self) -> Result<Account> {
        let envelope: AccountEnvelope = self.get("v2/account", &[]).await?;
        Ok(envelope.account)
    }

    pub async fn balance(&self) -> Result<Balance> {
        self.get("v2/customers/my/balance", &[]).await
    }

    /// Query one droplet monitoring series over `[start, end]`.
    pub async fn droplet_metrics(&self, query: &MetricQuery) -> Result<MetricsResponse> {
        let mut params: Vec<(&str, String)> = vec![
            ("host_id", query.host_id.clone()),
            ("start", query.start.to_string()),
            ("end", query.end.to_string()),
        ];
        params.extend(
            query
                .params
                .iter()
                .map(|(key, value)| (*key, value.to_string())),
        );

        let path = format!("v2/monitoring/metrics/droplet/{}", query.metric);
        self.get(&path, &params).await
    }
}
