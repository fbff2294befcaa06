use super::table::{ListingCollector, ResourceTable};
use super::{CollectorContext, GIB};
use crate::models::Image;

pub type ImageCollector = ListingCollector<Image>;

const LABELS: &[&str] = &["id", "name", "region", "type", "distribution"];

impl ListingCollector<Image> {
    /// Lists the account's private images only.
    pub fn new(ctx: CollectorContext) -> Self {
        let table = ResourceTable::new(LABELS, |img: &Image| {
            let region = img.regions.first()?;
            Some(vec![
                img.id.to_string(),
                img.name.clone(),
                region.clone(),
                img.kind.clone(),
                img.distribution.clone(),
            ])
        })
        .gauge(
            "digitalocean_image_min_disk_size_bytes",
            "Minimum disk size for a droplet to run this image on in bytes",
            |img| img.min_disk_size as f64 * GIB,
        );

        Self::from_table("image", ctx, table)
    }
}
