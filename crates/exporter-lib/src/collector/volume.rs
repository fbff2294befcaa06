use super::table::{ListingCollector, ResourceTable};
use super::{CollectorContext, GIB};
use crate::models::Volume;

pub type VolumeCollector = ListingCollector<Volume>;

impl ListingCollector<Volume> {
    pub fn new(ctx: CollectorContext) -> Self {
        let table = ResourceTable::new(&["id", "name", "region"], |v: &Volume| {
            Some(vec![v.id.clone(), v.name.clone(), v.region.slug.clone()])
        })
        .gauge(
            "digitalocean_volume_size_bytes",
            "Volume's size in bytes",
            |v| v.size_gigabytes as f64 * GIB,
        );

        Self::from_table("volume", ctx, table)
    }
}
