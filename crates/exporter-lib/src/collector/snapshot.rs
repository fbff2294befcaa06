use super::table::{ListingCollector, ResourceTable};
use super::{CollectorContext, GIB};
use crate::models::Snapshot;

pub type SnapshotCollector = ListingCollector<Snapshot>;

impl ListingCollector<Snapshot> {
    pub fn new(ctx: CollectorContext) -> Self {
        let table = ResourceTable::new(&["id", "name", "region", "type"], |s: &Snapshot| {
            let region = s.regions.first()?;
            Some(vec![
                s.id.clone(),
                s.name.clone(),
                region.clone(),
                s.resource_type.clone(),
            ])
        })
        .gauge(
            "digitalocean_snapshot_min_disk_size_bytes",
            "Minimum disk size for a droplet/volume to run this snapshot on in bytes",
            |s| s.min_disk_size as f64 * GIB,
        )
        .optional_gauge(
            "digitalocean_snapshot_size_bytes",
            "Snapshot's size in bytes",
            |s: &Snapshot| (s.size_gigabytes > 0.0).then(|| s.size_gigabytes * GIB),
        );

        Self::from_table("snapshot", ctx, table)
    }
}
