use super::table::{ListingCollector, ResourceTable};
use super::{status_gauge, CollectorContext, GB, MIB};
use crate::models::Droplet;

pub type DropletCollector = ListingCollector<Droplet>;

const LABELS: &[&str] = &["id", "name", "region"];

impl ListingCollector<Droplet> {
    pub fn new(ctx: CollectorContext) -> Self {
        let table = ResourceTable::new(LABELS, |d: &Droplet| {
            Some(vec![d.id.to_string(), d.name.clone(), d.region.slug.clone()])
        })
        .gauge(
            "digitalocean_droplet_up",
            "If 1 the droplet is up and running, 0 otherwise",
            |d| status_gauge(&d.status, "active"),
        )
        .gauge(
            "digitalocean_droplet_cpus",
            "Droplet's number of CPUs",
            |d| d.vcpus as f64,
        )
        // memory is reported in MiB, disk in GB
        .gauge(
            "digitalocean_droplet_memory_bytes",
            "Droplet's memory in bytes",
            |d| d.memory as f64 * MIB,
        )
        .gauge(
            "digitalocean_droplet_disk_bytes",
            "Droplet's disk in bytes",
            |d| d.disk as f64 * GB,
        )
        .gauge(
            "digitalocean_droplet_price_hourly",
            "Price of the Droplet billed hourly in dollars",
            |d| d.size.price_hourly,
        )
        .gauge(
            "digitalocean_droplet_price_monthly",
            "Price of the Droplet billed monthly in dollars",
            |d| d.size.price_monthly,
        );

        Self::from_table("droplet", ctx, table)
    }
}
