//! Pagination fetcher
//!
//! Drains a paginated listing into one collection. A failure part-way keeps
//! the pages fetched before it and reports the error alongside them, so the
//! caller decides what to emit.

use crate::error::{ExporterError, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::time::{timeout_at, Instant};
use tracing::debug;
use url::Url;

/// Largest page size the API accepts
pub const MAX_PER_PAGE: u32 = 200;

/// Page cursor sent with each listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: MAX_PER_PAGE,
        }
    }
}

/// Pagination links of a listing response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub pages: Option<Pages>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pages {
    #[serde(default)]
    pub first: String,
    #[serde(default)]
    pub prev: String,
    #[serde(default)]
    pub next: String,
    #[serde(default)]
    pub last: String,
}

impl Links {
    pub fn is_last_page(&self) -> bool {
        self.pages.as_ref().map_or(true, Pages::is_last)
    }

    /// Number of the page these links belong to.
    pub fn current_page(&self) -> Result<u32> {
        self.pages.as_ref().map_or(Ok(1), Pages::current)
    }
}

impl Pages {
    fn is_last(&self) -> bool {
        self.next.is_empty()
    }

    fn current(&self) -> Result<u32> {
        if self.prev.is_empty() {
            return Ok(1);
        }
        page_for_url(&self.prev).map(|prev| prev + 1)
    }
}

fn page_for_url(link: &str) -> Result<u32> {
    let url = Url::parse(link)
        .map_err(|e| ExporterError::Pagination(format!("invalid page link {}: {}", link, e)))?;

    let page = url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| ExporterError::Pagination(format!("no page number in {}", link)))?;

    page.parse()
        .map_err(|e| ExporterError::Pagination(format!("invalid page number {:?}: {}", page, e)))
}

/// One page of a listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub links: Option<Links>,
}

impl<T> Page<T> {
    /// A response without pagination metadata is the last page.
    pub fn is_last_page(&self) -> bool {
        self.links.as_ref().map_or(true, Links::is_last_page)
    }
}

/// Result of draining a listing: everything fetched, plus the error that
/// stopped the loop early, if any.
#[derive(Debug)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub error: Option<ExporterError>,
}

impl<T> Paged<T> {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Call `fetch` page after page until the last page, accumulating items in
/// iteration order.
///
/// The loop ends on the first page error, an unparseable or non-advancing
/// cursor, or when `deadline` passes. It never requests the same page twice.
pub async fn drain_pages<T, F, Fut>(deadline: Instant, mut fetch: F) -> Paged<T>
where
    F: FnMut(ListOptions) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut options = ListOptions::default();

    loop {
        let page = match timeout_at(deadline, fetch(options)).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => return Paged { items, error: Some(e) },
            Err(_) => {
                return Paged {
                    items,
                    error: Some(ExporterError::Timeout),
                }
            }
        };

        let last = page.is_last_page();
        let current = page.links.as_ref().map(Links::current_page);
        items.extend(page.items);

        if last {
            break;
        }

        let next = match current {
            Some(Ok(current)) => current + 1,
            Some(Err(e)) => return Paged { items, error: Some(e) },
            None => break,
        };

        if next <= options.page {
            return Paged {
                items,
                error: Some(ExporterError::Pagination(format!(
                    "cursor did not advance past page {}",
                    options.page
                ))),
            };
        }

        debug!(page = next, fetched = items.len(), "Fetching next page");
        options.page = next;
    }

    Paged { items, error: None }
}
