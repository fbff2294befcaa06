use super::table::{ListingCollector, ResourceTable};
use super::{bool_gauge, CollectorContext};
use crate::models::FloatingIp;

pub type FloatingIpCollector = ListingCollector<FloatingIp>;

const LABELS: &[&str] = &["droplet_id", "droplet_name", "region", "ipv4"];

impl ListingCollector<FloatingIp> {
    /// Unassigned IPs are reported as 0 with empty droplet labels.
    pub fn new(ctx: CollectorContext) -> Self {
        let table = ResourceTable::new(LABELS, |ip: &FloatingIp| {
            let (droplet_id, droplet_name) = match &ip.droplet {
                Some(droplet) => (droplet.id.to_string(), droplet.name.clone()),
                None => (String::new(), String::new()),
            };
            Some(vec![
                droplet_id,
                droplet_name,
                ip.region.slug.clone(),
                ip.ip.clone(),
            ])
        })
        .gauge(
            "digitalocean_floating_ipv4_active",
            "If 1 the floating ip used by a droplet, 0 otherwise",
            |ip| bool_gauge(ip.droplet.is_some()),
        );

        Self::from_table("floatingip", ctx, table)
    }
}
