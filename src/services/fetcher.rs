// src/services/fetcher.rs

//! CKAN resource resolution and paginated record download.
//!
//! Records are produced lazily as a stream: one page is requested at a time
//! and only that page is held in memory.

use futures::stream::{self, Stream, TryStreamExt};
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{FetchConfig, PackageShowResponse, RawEvent, SourceConfig};
use crate::utils::http::get_json;

const PACKAGE_SHOW_PATH: &str = "/api/3/action/package_show";
const LIMIT_PARAM: &str = "limit";

/// Service for locating and downloading the events dataset.
pub struct ResourceFetcher {
    client: Client,
    catalog_base: Url,
    package_id: String,
    batch_size: usize,
    page_param: String,
}

/// Cursor carried between page requests.
#[derive(Debug, Clone, Copy)]
struct PageCursor {
    page: usize,
    offset: usize,
    exhausted: bool,
}

impl ResourceFetcher {
    /// Create a new fetcher over an existing HTTP client.
    pub fn new(client: Client, source: &SourceConfig, fetch: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client,
            catalog_base: Url::parse(&source.catalog_base_url)?,
            package_id: source.package_id.clone(),
            batch_size: fetch.batch_size.max(1),
            page_param: fetch.page_param.clone(),
        })
    }

    /// Resolve the URL of the package's directly downloadable resource.
    pub async fn resolve_resource_url(&self) -> Result<Url> {
        let mut url = self.catalog_base.join(PACKAGE_SHOW_PATH)?;
        url.query_pairs_mut().append_pair("id", &self.package_id);

        log::info!("Fetching CKAN package metadata for '{}'", self.package_id);
        let response: PackageShowResponse = get_json(&self.client, &url).await?;

        let resource = response
            .result
            .downloadable_resource()
            .and_then(|r| r.url.as_deref())
            .ok_or_else(|| AppError::ResourceNotFound {
                package: self.package_id.clone(),
            })?;

        log::info!("Resolved resource URL: {}", resource);
        Ok(Url::parse(resource)?)
    }

    /// Lazily stream every record of a resource, page by page.
    ///
    /// Stops on an empty or short page. After `max_pages` full pages one more
    /// page is requested: if it is empty the data ended exactly at the cap,
    /// otherwise the stream fails with `PageCapExceeded` rather than
    /// truncating silently.
    pub fn records(
        &self,
        resource_url: &Url,
        max_pages: usize,
    ) -> impl Stream<Item = Result<RawEvent>> + '_ {
        let resource_url = resource_url.clone();
        let start = PageCursor {
            page: 0,
            offset: 0,
            exhausted: false,
        };

        stream::try_unfold(start, move |cursor| {
            let resource_url = resource_url.clone();
            async move { self.next_page(&resource_url, cursor, max_pages).await }
        })
        .map_ok(|batch| stream::iter(batch.into_iter().map(Ok::<RawEvent, AppError>)))
        .try_flatten()
    }

    /// Request the page under `cursor`, returning it with the next cursor.
    async fn next_page(
        &self,
        resource_url: &Url,
        cursor: PageCursor,
        max_pages: usize,
    ) -> Result<Option<(Vec<RawEvent>, PageCursor)>> {
        if cursor.exhausted {
            return Ok(None);
        }

        let url = page_url(resource_url, &self.page_param, self.batch_size, cursor.offset);
        let batch: Vec<RawEvent> = get_json(&self.client, &url).await?;
        if batch.is_empty() {
            log::debug!("Page {} is empty, end of data", cursor.page + 1);
            return Ok(None);
        }

        // Page `max_pages` is only fetched to confirm the data has ended.
        if cursor.page >= max_pages {
            return Err(AppError::PageCapExceeded {
                url: resource_url.to_string(),
                max_pages,
            });
        }

        log::info!("Page {}: {} records", cursor.page + 1, batch.len());
        let next = PageCursor {
            page: cursor.page + 1,
            offset: cursor.offset + self.batch_size,
            exhausted: batch.len() < self.batch_size,
        };
        Ok(Some((batch, next)))
    }
}

/// Merge pagination parameters into a resource URL.
///
/// Existing `limit`/offset values are replaced; every other query parameter
/// is kept in order.
pub fn page_url(resource_url: &Url, page_param: &str, limit: usize, offset: usize) -> Url {
    let kept: Vec<(String, String)> = resource_url
        .query_pairs()
        .filter(|(key, _)| key != LIMIT_PARAM && key != page_param)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = resource_url.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept.iter())
        .append_pair(LIMIT_PARAM, &limit.to_string())
        .append_pair(page_param, &offset.to_string());
    url
}
