use super::table::{ListingCollector, ResourceTable};
use super::{status_gauge, CollectorContext};
use crate::models::Database;

pub type DatabaseCollector = ListingCollector<Database>;

const LABELS: &[&str] = &[
    "id",
    "name",
    "maintenance_window_day",
    "maintenance_window_hour",
    "maintenance_window_pending",
    "region",
    "size",
    "engine",
    "version",
];

impl ListingCollector<Database> {
    /// Clusters without a maintenance window are skipped.
    pub fn new(ctx: CollectorContext) -> Self {
        let table = ResourceTable::new(LABELS, |db: &Database| {
            let window = db.maintenance_window.as_ref()?;
            Some(vec![
                db.id.clone(),
                db.name.clone(),
                window.day.clone(),
                window.hour.clone(),
                window.pending.to_string(),
                db.region_slug.clone(),
                db.size_slug.clone(),
                db.engine.clone(),
                db.version.clone(),
            ])
        })
        .gauge(
            "digitalocean_database_status",
            "If 1 the database is online, 0 otherwise",
            |db| status_gauge(&db.status, "online"),
        )
        .gauge(
            "digitalocean_database_nodes",
            "Number of nodes in a database cluster",
            |db| db.num_nodes as f64,
        );

        Self::from_table("database", ctx, table)
    }
}
