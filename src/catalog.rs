use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use url::Url;

use crate::assembler::RecordAssembler;
use crate::config::Config;
use crate::entity::EntityResolver;
use crate::error::{FetchError, FetchResult};
use crate::http::HttpClient;
use crate::images::ImageLoader;
use crate::record::{CatalogEntry, DisplayRecord, PageCursor};
use crate::storage::{expiry, MemoryStore, PageStore};

// The list endpoint expects every filter to be present, even when empty.
const LIST_FILTERS: &[&str] = &[
    "sort", "sports", "school", "events", "tags", "start", "end", "playlists",
    "published_by", "publish_to", "publish_to_mobile", "content_types", "show",
];

/// One fully assembled page.
#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<DisplayRecord>,
    pub next_page: PageCursor,
}

impl Page {
    pub fn has_more(&self) -> bool {
        !self.next_page.is_end()
    }
}

/// Fetches catalog pages and fans each entry out to the assembler.
#[derive(Clone)]
pub struct Catalog {
    http: HttpClient,
    assembler: RecordAssembler,
    cache: Arc<dyn PageStore>,
    cache_ttl: Duration,
    base_url: String,
    page_size: u32,
}

impl Catalog {
    pub fn new(http: HttpClient, config: &Config) -> Self {
        let resolver = EntityResolver::new(http.clone(), &config.base_url);
        let images = ImageLoader::new(http.clone());
        Self {
            http,
            assembler: RecordAssembler::new(resolver, images),
            cache: Arc::new(MemoryStore::new()),
            cache_ttl: config.page_cache_ttl(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn PageStore>) -> Self {
        self.cache = store;
        self
    }

    pub fn resolver(&self) -> EntityResolver {
        EntityResolver::new(self.http.clone(), &self.base_url)
    }

    /// First page of the list endpoint.
    pub fn initial_page_url(&self) -> String {
        let raw = format!("{}/vod", self.base_url);
        let Ok(mut url) = Url::parse(&raw) else { return raw };
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("page", "");
            q.append_pair("pagesize", &self.page_size.to_string());
            for key in LIST_FILTERS {
                q.append_pair(key, "");
            }
        }
        url.to_string()
    }

    pub async fn fetch_page(&self, url: &str) -> FetchResult<Page> {
        self.fetch_page_with_refresh(url, false).await
    }

    /// `refresh` skips the cache lookup; the result still overwrites the cached page.
    pub async fn fetch_page_with_refresh(&self, url: &str, refresh: bool) -> FetchResult<Page> {
        if !refresh {
            if let Some(page) = self.cache.get_page(url, Instant::now()) {
                info!(url, records = page.records.len(), "page served from cache");
                return Ok(page);
            }
        }

        let body = self.http.fetch_json(url).await?;
        let (programs, next_page) = parse_envelope(body)?;

        // Each entry gets its own task. Awaiting the handles in order keeps page order;
        // dropping this future detaches the tasks rather than cancelling them.
        let total = programs.len();
        let mut handles = Vec::with_capacity(total);
        for (idx, program) in programs.into_iter().enumerate() {
            let entry = match serde_json::from_value::<CatalogEntry>(program) {
                Ok(e) => e,
                Err(e) => {
                    warn!(url, idx, error = %e, "skipping malformed program");
                    continue;
                }
            };
            let assembler = self.assembler.clone();
            let cursor = next_page.clone();
            handles.push(tokio::spawn(async move { assembler.assemble(entry, cursor).await }));
        }

        let mut records = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(r) => records.push(r),
                // Assembly never fails on its own; a panic is a bug, so surface it.
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => warn!(url, error = %e, "record assembly task cancelled"),
            }
        }

        info!(url, records = records.len(), programs = total, next = %next_page, "page loaded");
        let page = Page { records, next_page };
        self.cache.put_page(url, page.clone(), expiry(Instant::now(), self.cache_ttl));
        Ok(page)
    }

    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }
}

/// Both `programs` and `next_page` are required, even on the last page.
pub(crate) fn parse_envelope(body: Value) -> FetchResult<(Vec<Value>, PageCursor)> {
    let Value::Object(mut map) = body else {
        return Err(FetchError::malformed("page payload is not an object"));
    };
    let programs = match map.remove("programs") {
        Some(Value::Array(items)) => items,
        _ => return Err(FetchError::malformed("page payload has no programs array")),
    };
    let next_page = match map.remove("next_page") {
        Some(Value::String(s)) => PageCursor::new(s),
        _ => return Err(FetchError::malformed("page payload has no next_page")),
    };
    Ok((programs, next_page))
}
