use super::table::{ListingCollector, ResourceTable};
use super::CollectorContext;
use crate::models::Key;

pub type KeyCollector = ListingCollector<Key>;

impl ListingCollector<Key> {
    pub fn new(ctx: CollectorContext) -> Self {
        let table = ResourceTable::new(&["id", "name", "fingerprint"], |k: &Key| {
            Some(vec![k.id.to_string(), k.name.clone(), k.fingerprint.clone()])
        })
        .gauge(
            "digitalocean_key",
            "Information about keys in your digitalocean account",
            |_| 1.0,
        );

        Self::from_table("key", ctx, table)
    }
}
