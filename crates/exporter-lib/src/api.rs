//! HTTP surface: landing page and the scrape endpoint

use crate::registry::CollectorRegistry;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Content type of the Prometheus text exposition format
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CollectorRegistry>,
    pub metrics_path: String,
}

impl AppState {
    pub fn new(registry: Arc<CollectorRegistry>, metrics_path: impl Into<String>) -> Self {
        Self {
            registry,
            metrics_path: metrics_path.into(),
        }
    }
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        r#"<html>
<head><title>DigitalOcean Exporter</title></head>
<body>
<h1>DigitalOcean Exporter</h1>
<p><a href="{}">Metrics</a></p>
</body>
</html>"#,
        state.metrics_path
    ))
}

/// Runs every collector and encodes the result
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.registry.render().await {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let metrics_path = state.metrics_path.clone();
    Router::new()
        .route("/", get(index))
        .route(&metrics_path, get(metrics))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(addr: &str, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Starting HTTP server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
