use super::table::{ListingCollector, ResourceTable};
use super::{status_gauge, CollectorContext};
use crate::models::LoadBalancer;

pub type LoadBalancerCollector = ListingCollector<LoadBalancer>;

impl ListingCollector<LoadBalancer> {
    pub fn new(ctx: CollectorContext) -> Self {
        let table = ResourceTable::new(&["id", "name", "ip"], |lb: &LoadBalancer| {
            Some(vec![lb.id.clone(), lb.name.clone(), lb.ip.clone()])
        })
        .gauge(
            "digitalocean_loadbalancer_droplets",
            "The number of droplets this load balancer is proxying to",
            |lb| lb.droplet_ids.len() as f64,
        )
        .gauge(
            "digitalocean_loadbalancer_status",
            "The status of the load balancer, 1 if active",
            |lb| status_gauge(&lb.status, "active"),
        );

        Self::from_table("loadbalancer", ctx, table)
    }
}
