use super::table::{ListingCollector, ResourceTable};
use super::CollectorContext;
use crate::models::App;

pub type AppCollector = ListingCollector<App>;

const LABELS: &[&str] = &["id", "name", "tier", "region", "phase"];

/// Phase of the deployment in progress, else of the active one. Apps that
/// were never deployed have neither and are skipped.
fn phase(app: &App) -> Option<String> {
    let active = app.active_deployment.as_ref()?;
    Some(
        app.in_progress_deployment
            .as_ref()
            .unwrap_or(active)
            .phase
            .clone(),
    )
}

impl ListingCollector<App> {
    pub fn new(ctx: CollectorContext) -> Self {
        let table = ResourceTable::new(LABELS, |app: &App| {
            let phase = phase(app)?;
            let region = app.region.as_ref()?;
            Some(vec![
                app.id.clone(),
                app.spec.name.clone(),
                app.tier_slug.clone(),
                region.slug.clone(),
                phase,
            ])
        })
        .gauge(
            "digitalocean_app",
            "Information about an app deployed on the app platform",
            |_| 1.0,
        );

        Self::from_table("app", ctx, table)
    }
}
