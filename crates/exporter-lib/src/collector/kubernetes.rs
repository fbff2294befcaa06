use super::{async_trait, status_gauge, Collector, CollectorContext};
use crate::models::KubernetesCluster;
use crate::sink::{GaugeDesc, MetricSink};

const CLUSTER_LABELS: &[&str] = &["id", "name", "region", "version"];
const NODE_POOL_LABELS: &[&str] = &["id", "name", "region"];

/// Collects Kubernetes clusters and their node pools.
pub struct KubernetesCollector {
    ctx: CollectorContext,
    count: GaugeDesc,
    up: GaugeDesc,
    node_pools: GaugeDesc,
    nodes: GaugeDesc,
}

impl KubernetesCollector {
    pub fn new(ctx: CollectorContext) -> Self {
        ctx.errors.init("kubernetes");

        Self {
            ctx,
            count: GaugeDesc::new(
                "digitalocean_kubernetes_cluster_count",
                "Number of Kubernetes clusters",
                &[],
            ),
            up: GaugeDesc::new(
                "digitalocean_kubernetes_cluster_up",
                "If 1 the kubernetes cluster is up and running, 0 otherwise",
                CLUSTER_LABELS,
            ),
            node_pools: GaugeDesc::new(
                "digitalocean_kubernetes_nodepools_count",
                "Number of Kubernetes nodepools",
                CLUSTER_LABELS,
            ),
            nodes: GaugeDesc::new(
                "digitalocean_kubernetes_nodes_count",
                "Number of Kubernetes nodes",
                NODE_POOL_LABELS,
            ),
        }
    }

    fn emit_cluster(&self, cluster: &KubernetesCluster, sink: &mut MetricSink) {
        let labels = [
            cluster.id.as_str(),
            cluster.name.as_str(),
            cluster.region_slug.as_str(),
            cluster.version_slug.as_str(),
        ];

        sink.gauge(
            &self.up,
            status_gauge(&cluster.status.state, "running"),
            &labels,
        );
        sink.gauge(&self.node_pools, cluster.node_pools.len() as f64, &labels);

        // Node pools live in their cluster's region; without one there is
        // nothing to label them with.
        if cluster.region_slug.is_empty() {
            return;
        }
        for pool in &cluster.node_pools {
            sink.gauge(
                &self.nodes,
                pool.count as f64,
                &[
                    pool.id.as_str(),
                    pool.name.as_str(),
                    cluster.region_slug.as_str(),
                ],
            );
        }
    }
}

#[async_trait]
impl Collector for KubernetesCollector {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    fn describe(&self) -> Vec<&GaugeDesc> {
        vec![&self.count, &self.up, &self.node_pools, &self.nodes]
    }

    async fn collect(&self, sink: &mut MetricSink) {
        let clusters = self
            .ctx
            .client
            .list_all::<KubernetesCluster>(self.ctx.deadline())
            .await;
        if let Some(e) = &clusters.error {
            self.ctx.record_failure(self.name(), "can't list clusters", e);
        }

        let none: &[&str] = &[];
        sink.gauge(&self.count, clusters.items.len() as f64, none);

        for cluster in &clusters.items {
            self.emit_cluster(cluster, sink);
        }
    }
}
