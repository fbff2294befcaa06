//! Resource snapshots returned by the DigitalOcean API
//!
//! Only the fields the collectors read are modelled; everything else in the
//! payload is ignored by serde. Every value is created fresh per scrape.

use crate::client::Listable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub available: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Size {
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_monthly: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_hourly: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Droplet {
    pub id: u64,
    pub name: String,
    /// Memory in MiB
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vcpus: u64,
    /// Disk in GB
    #[serde(default, deserialize_with = "null_as_default")]
    pub disk: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub size: Size,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: Region,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size_gigabytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub distribution: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub regions: Vec<String>,
    /// Minimum disk size in GiB
    #[serde(default, deserialize_with = "null_as_default")]
    pub min_disk_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Key {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub fingerprint: String,
}

/// The droplet a floating IP is assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedDroplet {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingIp {
    pub ip: String,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub droplet: Option<AssignedDroplet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub regions: Vec<String>,
    /// Minimum disk size in GiB
    #[serde(default, deserialize_with = "null_as_default")]
    pub min_disk_size: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size_gigabytes: f64,
    #[serde(default)]
    pub resource_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub hour: String,
    #[serde(default)]
    pub pending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub engine: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_nodes: u64,
    #[serde(rename = "size", default)]
    pub size_slug: String,
    #[serde(rename = "region", default)]
    pub region_slug: String,
    #[serde(default)]
    pub maintenance_window: Option<MaintenanceWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttl: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRecord {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub weight: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub droplet_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodePool {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubernetesCluster {
    pub id: String,
    pub name: String,
    #[serde(rename = "region", default)]
    pub region_slug: String,
    #[serde(rename = "version", default)]
    pub version_slug: String,
    #[serde(default)]
    pub status: ClusterStatus,
    #[serde(default)]
    pub node_pools: Vec<NodePool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSpec {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    #[serde(default)]
    pub phase: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    #[serde(default)]
    pub spec: AppSpec,
    #[serde(default)]
    pub tier_slug: String,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub active_deployment: Option<Deployment>,
    #[serde(default)]
    pub in_progress_deployment: Option<Deployment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, deserialize_with = "null_as_default")]
    pub droplet_limit: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub floating_ip_limit: u64,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub status: String,
}

/// Billing balance. Amounts are decimal strings in the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub month_to_date_balance: String,
    #[serde(default)]
    pub account_balance: String,
    #[serde(default)]
    pub month_to_date_usage: String,
    pub generated_at: DateTime<Utc>,
}

/// Response of a droplet monitoring query, in Prometheus range-query shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub status: String,
    pub data: MetricsData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsData {
    #[serde(rename = "resultType", default)]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<SampleStream>,
}

/// One time series: its label set plus `[timestamp, "value"]` pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleStream {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    #[serde(default)]
    pub values: Vec<(f64, String)>,
}

impl SampleStream {
    /// Series label value, empty when the series does not carry it.
    pub fn label(&self, key: &str) -> &str {
        self.metric.get(key).map(String::as_str).unwrap_or("")
    }

    /// Most recent raw sample value.
    pub fn last_value(&self) -> Option<&str> {
        self.values.last().map(|(_, value)| value.as_str())
    }
}

impl Listable for Droplet {
    const PATH: &'static str = "v2/droplets";
    const KEY: &'static str = "droplets";
}

impl Listable for Volume {
    const PATH: &'static str = "v2/volumes";
    const KEY: &'static str = "volumes";
}

impl Listable for Image {
    const PATH: &'static str = "v2/images";
    const KEY: &'static str = "images";
    const QUERY: &'static [(&'static str, &'static str)] = &[("private", "true")];
}

impl Listable for Key {
    const PATH: &'static str = "v2/account/keys";
    const KEY: &'static str = "ssh_keys";
}

impl Listable for FloatingIp {
    const PATH: &'static str = "v2/floating_ips";
    const KEY: &'static str = "floating_ips";
}

impl Listable for Snapshot {
    const PATH: &'static str = "v2/snapshots";
    const KEY: &'static str = "snapshots";
}

impl Listable for Database {
    const PATH: &'static str = "v2/databases";
    const KEY: &'static str = "databases";
}

impl Listable for Domain {
    const PATH: &'static str = "v2/domains";
    const KEY: &'static str = "domains";
}

impl Listable for LoadBalancer {
    const PATH: &'static str = "v2/load_balancers";
    const KEY: &'static str = "load_balancers";
}

impl Listable for KubernetesCluster {
    const PATH: &'static str = "v2/kubernetes/clusters";
    const KEY: &'static str = "kubernetes_clusters";
}

impl Listable for App {
    const PATH: &'static str = "v2/apps";
    const KEY: &'static str = "apps";
}

impl Listable for Region {
    const PATH: &'static str = "v2/regions";
    const KEY: &'static str = "regions";
}
