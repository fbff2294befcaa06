//! Error type shared by the resource client, the collectors and the registry

use std::num::ParseFloatError;

/// Errors raised while talking to the DigitalOcean API or building metrics.
///
/// Collectors never return these to the scrape; they log them and count them
/// on `digitalocean_errors_total`.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// Non-2xx status code from the API.
    #[error("DigitalOcean API HTTP error: status={status}, body={body}")]
    Api { status: u16, body: String },

    /// Transport error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response payload could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Pagination links could not be turned into a page number.
    #[error("Pagination error: {0}")]
    Pagination(String),

    /// The collector's deadline expired before the call returned.
    #[error("Request deadline exceeded")]
    Timeout,

    /// A numeric API field delivered as a string did not parse.
    #[error("Can't parse {field} as a number: {source}")]
    ParseFloat {
        field: String,
        #[source]
        source: ParseFloatError,
    },

    /// The object storage endpoint for a region does not resolve. Regions
    /// without Spaces behave this way.
    #[error("Name resolution failed for {host}: {message}")]
    NameResolution { host: String, message: String },

    #[error("Object storage error: {0}")]
    Storage(String),

    /// Invalid descriptor or encoding failure from `prometheus`.
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Metric {0} is already described by another collector")]
    DuplicateDescriptor(String),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, ExporterError>;
