//! Collector tests against a mocked DigitalOcean API
//!
//! Each test stands up a mockito server, runs one collector through a
//! `MetricSink` and inspects the resulting metric families.

#[cfg(test)]
mod mock_api_tests {
    use crate::client::DigitalOceanClient;
    use crate::collector::{
        AccountCollector, AppCollector, BalanceCollector, Bucket, BucketLister, BuildInfo,
        Collector, CollectorContext, DatabaseCollector, DomainCollector, DropletCollector,
        ExporterCollector, FloatingIpCollector, ImageCollector, IncidentCollector, KeyCollector,
        KubernetesCollector, LoadBalancerCollector, MonitoringCollector, SnapshotCollector,
        SpacesCollector, VolumeCollector,
    };
    use crate::error::{ExporterError, Result};
    use crate::observability::ErrorCounter;
    use crate::sink::MetricSink;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use mockito::{Matcher, Server, ServerGuard};
    use prometheus::proto::MetricFamily;
    use std::sync::Arc;
    use std::time::Duration;

    fn context(server: &ServerGuard) -> CollectorContext {
        let client =
            DigitalOceanClient::new("test-token", &server.url(), Duration::from_secs(5)).unwrap();
        CollectorContext::new(
            Arc::new(client),
            ErrorCounter::new().unwrap(),
            Duration::from_secs(5),
        )
    }

    async fn run(collector: &dyn Collector) -> Vec<MetricFamily> {
        let mut sink = MetricSink::new(collector.name(), collector.describe());
        collector.collect(&mut sink).await;
        assert_eq!(sink.rejected(), 0, "collector emitted malformed samples");
        sink.finish()
    }

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> Option<&'a MetricFamily> {
        families.iter().find(|f| f.get_name() == name)
    }

    /// Value of the sample of `name` whose label values equal `labels`
    fn value(families: &[MetricFamily], name: &str, labels: &[&str]) -> Option<f64> {
        family(families, name)?
            .get_metric()
            .iter()
            .find(|m| {
                m.get_label()
                    .iter()
                    .map(|l| l.get_value())
                    .eq(labels.iter().copied())
            })
            .map(|m| m.get_gauge().get_value())
    }

    fn sample_count(families: &[MetricFamily], name: &str) -> usize {
        family(families, name).map_or(0, |f| f.get_metric().len())
    }

    async fn mock_list(server: &mut ServerGuard, path: &str, body: String) -> mockito::Mock {
        server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    fn droplet(id: u64, name: &str, status: &str) -> String {
        format!(
            r#"{{"id": {id}, "name": "{name}", "memory": 1024, "vcpus": 2, "disk": 25,
                "status": "{status}", "region": {{"slug": "fra1", "name": "Frankfurt 1"}},
                "size": {{"slug": "s-2vcpu-1gb", "price_monthly": 12.0, "price_hourly": 0.01786}}}}"#
        )
    }

    #[tokio::test]
    async fn test_droplet_units_and_status() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/droplets",
            format!(
                r#"{{"droplets": [{}, {}], "links": {{}}}}"#,
                droplet(1, "web-1", "ACTIVE"),
                droplet(2, "web-2", "new")
            ),
        )
        .await;

        let collector = DropletCollector::new(context(&server));
        let families = run(&collector).await;

        let web1 = ["1", "web-1", "fra1"];
        assert_eq!(value(&families, "digitalocean_droplet_up", &web1), Some(1.0));
        assert_eq!(
            value(&families, "digitalocean_droplet_up", &["2", "web-2", "fra1"]),
            Some(0.0)
        );
        assert_eq!(
            value(&families, "digitalocean_droplet_memory_bytes", &web1),
            Some(1_073_741_824.0)
        );
        assert_eq!(
            value(&families, "digitalocean_droplet_disk_bytes", &web1),
            Some(25_000_000_000.0)
        );
        assert_eq!(value(&families, "digitalocean_droplet_cpus", &web1), Some(2.0));
        assert_eq!(
            value(&families, "digitalocean_droplet_price_monthly", &web1),
            Some(12.0)
        );
    }

    #[tokio::test]
    async fn test_listing_failure_is_counted_and_emits_nothing() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v2/droplets")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"id": "server_error"}"#)
            .create_async()
            .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let collector = DropletCollector::new(ctx);
        let families = run(&collector).await;

        assert!(families.is_empty());
        assert_eq!(errors.get("droplet"), 1);
    }

    #[tokio::test]
    async fn test_failure_on_later_page_keeps_earlier_items() {
        let mut server = Server::new_async().await;
        let base = server.url();
        server
            .mock("GET", "/v2/droplets")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(format!(
                r#"{{"droplets": [{}], "links": {{"pages": {{"next": "{base}/v2/droplets?page=2"}}}}}}"#,
                droplet(1, "web-1", "active")
            ))
            .create_async()
            .await;
        server
            .mock("GET", "/v2/droplets")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(503)
            .create_async()
            .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let collector = DropletCollector::new(ctx);
        let families = run(&collector).await;

        assert_eq!(sample_count(&families, "digitalocean_droplet_up"), 1);
        assert_eq!(errors.get("droplet"), 1);
    }

    #[tokio::test]
    async fn test_balance_parse_failure_emits_sentinel() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v2/customers/my/balance")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"month_to_date_balance": "n/a", "account_balance": "12.23",
                    "month_to_date_usage": "23.44", "generated_at": "2019-07-09T15:01:12Z"}"#,
            )
            .create_async()
            .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let collector = BalanceCollector::new(ctx);
        let families = run(&collector).await;

        assert_eq!(
            value(&families, "digitalocean_month_to_date_balance", &[]),
            Some(-1.0)
        );
        assert_eq!(value(&families, "digitalocean_account_balance", &[]), Some(12.23));
        assert_eq!(
            value(&families, "digitalocean_balance_generated_at", &[]),
            Some(1_562_684_472.0)
        );
        assert_eq!(errors.get("balance"), 1);
    }

    #[tokio::test]
    async fn test_app_without_active_deployment_is_skipped() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/apps",
            r#"{"apps": [
                {"id": "a1", "spec": {"name": "site"}, "tier_slug": "basic",
                 "region": {"slug": "ams"},
                 "active_deployment": {"id": "d1", "phase": "ACTIVE"},
                 "in_progress_deployment": {"id": "d2", "phase": "BUILDING"}},
                {"id": "a2", "spec": {"name": "draft"}, "tier_slug": "basic",
                 "region": {"slug": "ams"}}
            ]}"#
            .to_string(),
        )
        .await;

        let collector = AppCollector::new(context(&server));
        let families = run(&collector).await;

        assert_eq!(sample_count(&families, "digitalocean_app"), 1);
        assert_eq!(
            value(
                &families,
                "digitalocean_app",
                &["a1", "site", "basic", "ams", "BUILDING"]
            ),
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn test_unassigned_floating_ip_has_empty_droplet_labels() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/floating_ips",
            r#"{"floating_ips": [
                {"ip": "45.55.96.47", "region": {"slug": "nyc3"}, "droplet": {"id": 7, "name": "db"}},
                {"ip": "45.55.96.48", "region": {"slug": "nyc3"}, "droplet": null}
            ]}"#
            .to_string(),
        )
        .await;

        let collector = FloatingIpCollector::new(context(&server));
        let families = run(&collector).await;

        let name = "digitalocean_floating_ipv4_active";
        assert_eq!(value(&families, name, &["7", "db", "nyc3", "45.55.96.47"]), Some(1.0));
        assert_eq!(value(&families, name, &["", "", "nyc3", "45.55.96.48"]), Some(0.0));
    }

    #[tokio::test]
    async fn test_kubernetes_node_pools_need_cluster_region() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/kubernetes/clusters",
            r#"{"kubernetes_clusters": [
                {"id": "k1", "name": "prod", "region": "fra1", "version": "1.29.1-do.0",
                 "status": {"state": "running"},
                 "node_pools": [{"id": "p1", "name": "workers", "count": 3},
                                {"id": "p2", "name": "gpu", "count": 1}]},
                {"id": "k2", "name": "orphan", "region": "", "version": "1.28.2-do.0",
                 "status": {"state": "degraded"},
                 "node_pools": [{"id": "p3", "name": "workers", "count": 2}]}
            ]}"#
            .to_string(),
        )
        .await;

        let collector = KubernetesCollector::new(context(&server));
        let families = run(&collector).await;

        assert_eq!(value(&families, "digitalocean_kubernetes_cluster_count", &[]), Some(2.0));
        assert_eq!(
            value(
                &families,
                "digitalocean_kubernetes_cluster_up",
                &["k1", "prod", "fra1", "1.29.1-do.0"]
            ),
            Some(1.0)
        );
        assert_eq!(
            value(
                &families,
                "digitalocean_kubernetes_nodepools_count",
                &["k2", "orphan", "", "1.28.2-do.0"]
            ),
            Some(1.0)
        );
        assert_eq!(sample_count(&families, "digitalocean_kubernetes_nodes_count"), 2);
        assert_eq!(
            value(
                &families,
                "digitalocean_kubernetes_nodes_count",
                &["p1", "workers", "fra1"]
            ),
            Some(3.0)
        );
    }

    #[tokio::test]
    async fn test_kubernetes_cluster_count_survives_listing_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v2/kubernetes/clusters")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let collector = KubernetesCollector::new(ctx);
        let families = run(&collector).await;

        assert_eq!(value(&families, "digitalocean_kubernetes_cluster_count", &[]), Some(0.0));
        assert_eq!(errors.get("kubernetes"), 1);
    }

    #[tokio::test]
    async fn test_domain_records_default_missing_fields_to_zero() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/domains",
            r#"{"domains": [{"name": "example.com", "ttl": 1800}]}"#.to_string(),
        )
        .await;
        mock_list(
            &mut server,
            "/v2/domains/example.com/records",
            r#"{"domain_records": [
                {"id": 10, "type": "MX", "name": "@", "data": "mail.example.com",
                 "priority": 10, "port": null, "weight": null},
                {"id": 11, "type": "SRV", "name": "_sip._tcp", "data": "sip.example.com",
                 "priority": 0, "port": 5060, "weight": 5}
            ]}"#
            .to_string(),
        )
        .await;

        let collector = DomainCollector::new(context(&server));
        let families = run(&collector).await;

        assert_eq!(
            value(&families, "digitalocean_domain_ttl_seconds", &["example.com"]),
            Some(1800.0)
        );
        let mx = ["10", "@", "MX", "mail.example.com"];
        assert_eq!(value(&families, "digitalocean_domain_record_priority", &mx), Some(10.0));
        assert_eq!(value(&families, "digitalocean_domain_record_port", &mx), Some(0.0));
        let srv = ["11", "_sip._tcp", "SRV", "sip.example.com"];
        assert_eq!(value(&families, "digitalocean_domain_record_port", &srv), Some(5060.0));
        assert_eq!(value(&families, "digitalocean_domain_record_weight", &srv), Some(5.0));
    }

    #[tokio::test]
    async fn test_monitoring_query_failures_are_independent() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/droplets",
            format!(r#"{{"droplets": [{}]}}"#, droplet(3, "worker", "active")),
        )
        .await;
        server
            .mock("GET", "/v2/monitoring/metrics/droplet/cpu")
            .match_query(Matcher::UrlEncoded("host_id".into(), "3".into()))
            .with_status(200)
            .with_body(
                r#"{"status": "success", "data": {"resultType": "matrix", "result": [
                    {"metric": {"host_id": "3", "mode": "idle"},
                     "values": [[1700000000, "100.5"], [1700000060, "160.25"]]},
                    {"metric": {"host_id": "3", "mode": "user"},
                     "values": [[1700000060, "garbage"]]},
                    {"metric": {"host_id": "3", "mode": "steal"}, "values": []}
                ]}}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/v2/monitoring/metrics/droplet/bandwidth")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("interface".into(), "public".into()),
                Matcher::UrlEncoded("direction".into(), "inbound".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"status": "success", "data": {"resultType": "matrix", "result": [
                    {"metric": {"host_id": "3"}, "values": [[1700000060, "0.5"]]}
                ]}}"#,
            )
            .create_async()
            .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let collector = MonitoringCollector::new(ctx);
        let families = run(&collector).await;

        let base = ["3", "worker", "fra1"];
        assert_eq!(
            value(&families, "digitalocean_monitoring_cpu", &["3", "worker", "fra1", "idle"]),
            Some(160.25)
        );
        assert_eq!(
            value(&families, "digitalocean_monitoring_cpu", &["3", "worker", "fra1", "user"]),
            Some(-1.0)
        );
        assert_eq!(sample_count(&families, "digitalocean_monitoring_cpu"), 2);
        assert_eq!(
            value(
                &families,
                "digitalocean_monitoring_bandwidth",
                &["3", "worker", "fra1", "public", "inbound"]
            ),
            Some(0.5)
        );
        assert_eq!(value(&families, "digitalocean_monitoring_memory_total", &base), None);
        // 9 unmocked queries plus one unparseable sample
        assert_eq!(errors.get("monitoring"), 10);
    }

    struct FakeLister;

    #[async_trait]
    impl BucketLister for FakeLister {
        async fn list_buckets(&self, region: &str) -> Result<Vec<Bucket>> {
            match region {
                "nyc3" => Ok(vec![Bucket {
                    name: "backups".to_string(),
                    creation_date: Some(1_600_000_000),
                }]),
                "ams3" => Ok(vec![Bucket {
                    name: "assets".to_string(),
                    creation_date: None,
                }]),
                "fail1" => Err(ExporterError::Storage("AccessDenied".to_string())),
                other => Err(ExporterError::NameResolution {
                    host: format!("{other}.digitaloceanspaces.com"),
                    message: "dns error".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_spaces_ignores_regions_without_spaces() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/regions",
            r#"{"regions": [{"slug": "nyc3"}, {"slug": "ams3"}, {"slug": "tor1"},
                            {"slug": "blr1"}, {"slug": "fail1"}]}"#
                .to_string(),
        )
        .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let collector = SpacesCollector::new(ctx, Arc::new(FakeLister));
        let families = run(&collector).await;

        assert_eq!(sample_count(&families, "digitalocean_spaces_bucket"), 2);
        assert_eq!(
            value(&families, "digitalocean_spaces_bucket_created", &["nyc3", "backups"]),
            Some(1_600_000_000.0)
        );
        assert_eq!(
            value(&families, "digitalocean_spaces_bucket_created", &["ams3", "assets"]),
            None
        );
        assert_eq!(errors.get("spaces_bucket"), 1);
    }

    #[tokio::test]
    async fn test_incidents_counted_per_region() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v2/summary.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"page": {"id": "s2k7tnzlhrpw"}, "incidents": [
                    {"name": "DigitalOcean API Latency in SFO3"},
                    {"name": "Droplet creation failures in SFO3"},
                    {"name": "Partial service disruption"}
                ]}"#,
            )
            .create_async()
            .await;

        let url = format!("{}/api/v2/summary.json", server.url());
        let collector = IncidentCollector::with_url(context(&server), url).unwrap();
        let families = run(&collector).await;

        assert_eq!(value(&families, "digitalocean_incidents", &["sfo3"]), Some(2.0));
        assert_eq!(value(&families, "digitalocean_incidents", &["unspecified"]), Some(1.0));
        assert_eq!(value(&families, "digitalocean_incidents_total", &[]), Some(3.0));
    }

    #[tokio::test]
    async fn test_incidents_total_reported_when_status_page_fails() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v2/summary.json")
            .with_status(502)
            .create_async()
            .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let url = format!("{}/api/v2/summary.json", server.url());
        let collector = IncidentCollector::with_url(ctx, url).unwrap();
        let families = run(&collector).await;

        assert_eq!(sample_count(&families, "digitalocean_incidents"), 0);
        assert_eq!(value(&families, "digitalocean_incidents_total", &[]), Some(0.0));
        assert_eq!(errors.get("incidents"), 1);
    }

    #[tokio::test]
    async fn test_volume_size_in_binary_bytes() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/volumes",
            r#"{"volumes": [
                {"id": "v1", "name": "data", "region": {"slug": "nyc1"}, "size_gigabytes": 10},
                {"id": "v2", "name": "scratch", "region": {"slug": "nyc1"}, "size_gigabytes": null}
            ]}"#
            .to_string(),
        )
        .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let collector = VolumeCollector::new(ctx);
        let families = run(&collector).await;

        assert_eq!(
            value(&families, "digitalocean_volume_size_bytes", &["v1", "data", "nyc1"]),
            Some(10_737_418_240.0)
        );
        assert_eq!(
            value(&families, "digitalocean_volume_size_bytes", &["v2", "scratch", "nyc1"]),
            Some(0.0)
        );
        assert_eq!(errors.get("volume"), 0);
    }

    #[tokio::test]
    async fn test_image_with_null_disk_size_keeps_the_page() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/images",
            r#"{"images": [
                {"id": 11, "name": "base", "type": "snapshot", "distribution": "Ubuntu",
                 "regions": ["nyc3", "ams3"], "min_disk_size": 20},
                {"id": 12, "name": "uploading", "type": "custom", "distribution": "Debian",
                 "regions": ["fra1"], "min_disk_size": null},
                {"id": 13, "name": "unplaced", "type": "custom", "distribution": "Debian",
                 "regions": [], "min_disk_size": 5}
            ]}"#
            .to_string(),
        )
        .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let collector = ImageCollector::new(ctx);
        let families = run(&collector).await;

        let name = "digitalocean_image_min_disk_size_bytes";
        assert_eq!(sample_count(&families, name), 2);
        assert_eq!(
            value(&families, name, &["11", "base", "nyc3", "snapshot", "Ubuntu"]),
            Some(21_474_836_480.0)
        );
        assert_eq!(
            value(&families, name, &["12", "uploading", "fra1", "custom", "Debian"]),
            Some(0.0)
        );
        assert_eq!(errors.get("image"), 0);
    }

    #[tokio::test]
    async fn test_snapshot_size_only_when_known() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/snapshots",
            r#"{"snapshots": [
                {"id": "s1", "name": "nightly", "regions": ["lon1"], "min_disk_size": 25,
                 "size_gigabytes": 1.5, "resource_type": "droplet"},
                {"id": "s2", "name": "pending", "regions": ["lon1"], "min_disk_size": 40,
                 "size_gigabytes": 0, "resource_type": "volume"},
                {"id": "s3", "name": "orphan", "regions": [], "min_disk_size": 10,
                 "size_gigabytes": 2, "resource_type": "droplet"}
            ]}"#
            .to_string(),
        )
        .await;

        let collector = SnapshotCollector::new(context(&server));
        let families = run(&collector).await;

        let nightly = ["s1", "nightly", "lon1", "droplet"];
        let pending = ["s2", "pending", "lon1", "volume"];
        assert_eq!(
            value(&families, "digitalocean_snapshot_min_disk_size_bytes", &nightly),
            Some(26_843_545_600.0)
        );
        assert_eq!(
            value(&families, "digitalocean_snapshot_size_bytes", &nightly),
            Some(1_610_612_736.0)
        );
        assert_eq!(
            value(&families, "digitalocean_snapshot_min_disk_size_bytes", &pending),
            Some(42_949_672_960.0)
        );
        assert_eq!(value(&families, "digitalocean_snapshot_size_bytes", &pending), None);
        assert_eq!(sample_count(&families, "digitalocean_snapshot_min_disk_size_bytes"), 2);
        assert_eq!(sample_count(&families, "digitalocean_snapshot_size_bytes"), 1);
    }

    #[tokio::test]
    async fn test_database_labels_and_online_status() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/databases",
            r#"{"databases": [
                {"id": "db1", "name": "main", "engine": "pg", "version": "16",
                 "status": "online", "num_nodes": 3, "size": "db-s-2vcpu-4gb",
                 "region": "nyc1",
                 "maintenance_window": {"day": "tuesday", "hour": "08:45:12", "pending": true}},
                {"id": "db2", "name": "cache", "engine": "redis", "version": "7",
                 "status": "forking", "num_nodes": 1, "size": "db-s-1vcpu-1gb",
                 "region": "sfo2",
                 "maintenance_window": {"day": "sunday", "hour": "02:00:00", "pending": false}},
                {"id": "db3", "name": "fresh", "engine": "mysql", "version": "8",
                 "status": "creating", "num_nodes": 1, "size": "db-s-1vcpu-1gb",
                 "region": "sfo2", "maintenance_window": null}
            ]}"#
            .to_string(),
        )
        .await;

        let collector = DatabaseCollector::new(context(&server));
        let families = run(&collector).await;

        let status = family(&families, "digitalocean_database_status").unwrap();
        let names: Vec<&str> = status.get_metric()[0]
            .get_label()
            .iter()
            .map(|l| l.get_name())
            .collect();
        assert_eq!(
            names,
            vec![
                "id",
                "name",
                "maintenance_window_day",
                "maintenance_window_hour",
                "maintenance_window_pending",
                "region",
                "size",
                "engine",
                "version",
            ]
        );

        let main = [
            "db1", "main", "tuesday", "08:45:12", "true", "nyc1", "db-s-2vcpu-4gb", "pg", "16",
        ];
        let cache = [
            "db2", "cache", "sunday", "02:00:00", "false", "sfo2", "db-s-1vcpu-1gb", "redis", "7",
        ];
        assert_eq!(value(&families, "digitalocean_database_status", &main), Some(1.0));
        assert_eq!(value(&families, "digitalocean_database_status", &cache), Some(0.0));
        assert_eq!(value(&families, "digitalocean_database_nodes", &main), Some(3.0));
        assert_eq!(sample_count(&families, "digitalocean_database_status"), 2);
        assert_eq!(sample_count(&families, "digitalocean_database_nodes"), 2);
    }

    #[tokio::test]
    async fn test_app_without_region_is_skipped() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/apps",
            r#"{"apps": [
                {"id": "a1", "spec": {"name": "site"}, "tier_slug": "basic",
                 "region": {"slug": "ams"},
                 "active_deployment": {"id": "d1", "phase": "ACTIVE"}},
                {"id": "a2", "spec": {"name": "worker"}, "tier_slug": "basic",
                 "region": null,
                 "active_deployment": {"id": "d3", "phase": "ACTIVE"}}
            ]}"#
            .to_string(),
        )
        .await;

        let collector = AppCollector::new(context(&server));
        let families = run(&collector).await;

        assert_eq!(sample_count(&families, "digitalocean_app"), 1);
        assert_eq!(
            value(
                &families,
                "digitalocean_app",
                &["a1", "site", "basic", "ams", "ACTIVE"]
            ),
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn test_load_balancer_status_and_droplets() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/load_balancers",
            r#"{"load_balancers": [
                {"id": "lb1", "name": "edge", "ip": "104.131.186.241", "status": "active",
                 "droplet_ids": [3164444, 3164445, 3164446]},
                {"id": "lb2", "name": "staging", "ip": "", "status": "new",
                 "droplet_ids": null}
            ]}"#
            .to_string(),
        )
        .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let collector = LoadBalancerCollector::new(ctx);
        let families = run(&collector).await;

        let edge = ["lb1", "edge", "104.131.186.241"];
        let staging = ["lb2", "staging", ""];
        assert_eq!(value(&families, "digitalocean_loadbalancer_status", &edge), Some(1.0));
        assert_eq!(value(&families, "digitalocean_loadbalancer_droplets", &edge), Some(3.0));
        assert_eq!(value(&families, "digitalocean_loadbalancer_status", &staging), Some(0.0));
        assert_eq!(
            value(&families, "digitalocean_loadbalancer_droplets", &staging),
            Some(0.0)
        );
        assert_eq!(errors.get("loadbalancer"), 0);
    }

    #[tokio::test]
    async fn test_keys_are_reported_as_present() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/account/keys",
            r#"{"ssh_keys": [
                {"id": 512189, "name": "laptop",
                 "fingerprint": "3b:16:bf:e4:8b:00:8b:b8:59:8c:a9:d3:f0:19:45:fa"}
            ]}"#
            .to_string(),
        )
        .await;

        let collector = KeyCollector::new(context(&server));
        let families = run(&collector).await;

        assert_eq!(
            value(
                &families,
                "digitalocean_key",
                &["512189", "laptop", "3b:16:bf:e4:8b:00:8b:b8:59:8c:a9:d3:f0:19:45:fa"]
            ),
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn test_account_limits_and_status() {
        let mut server = Server::new_async().await;
        mock_list(
            &mut server,
            "/v2/account",
            r#"{"account": {"droplet_limit": 25, "floating_ip_limit": 5,
                "email_verified": true, "status": "warning"}}"#
                .to_string(),
        )
        .await;

        let collector = AccountCollector::new(context(&server));
        let families = run(&collector).await;

        assert_eq!(value(&families, "digitalocean_account_droplet_limit", &[]), Some(25.0));
        assert_eq!(
            value(&families, "digitalocean_account_floating_ip_limit", &[]),
            Some(5.0)
        );
        assert_eq!(value(&families, "digitalocean_account_verified", &[]), Some(1.0));
        assert_eq!(
            value(&families, "digitalocean_account_status", &["warning"]),
            Some(0.0)
        );
    }

    #[tokio::test]
    async fn test_account_failure_is_counted() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v2/account")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"id": "unauthorized"}"#)
            .create_async()
            .await;

        let ctx = context(&server);
        let errors = ctx.errors.clone();
        let collector = AccountCollector::new(ctx);
        let families = run(&collector).await;

        assert!(families.is_empty());
        assert_eq!(errors.get("account"), 1);
    }

    #[tokio::test]
    async fn test_exporter_start_time_and_build_info() {
        let started_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let build = BuildInfo {
            version: "1.2.3".to_string(),
            revision: "abc1234".to_string(),
            builddate: "2024-01-02".to_string(),
        };

        let collector = ExporterCollector::new(build, started_at);
        let families = run(&collector).await;

        assert_eq!(
            value(&families, "digitalocean_start_time", &[]),
            Some(1_700_000_000.0)
        );
        assert_eq!(
            value(
                &families,
                "digitalocean_build_info",
                &["1.2.3", "abc1234", "2024-01-02"]
            ),
            Some(1.0)
        );
    }
}
