use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::{FetchError, FetchResult};
use crate::record::{DisplayRecord, PageCursor};

/// Callbacks into whatever renders the feed.
pub trait FeedObserver {
    fn on_page_loaded(&mut self, records: &[DisplayRecord], has_more: bool);
    fn on_page_failed(&mut self, error: &FetchError);
}

/// Observer that ignores everything; handy for headless drivers.
pub struct NoopObserver;

impl FeedObserver for NoopObserver {
    fn on_page_loaded(&mut self, _records: &[DisplayRecord], _has_more: bool) {}
    fn on_page_failed(&mut self, _error: &FetchError) {}
}

/// Append-only list of records plus the cursor of the page to load next.
///
/// All methods take `&mut self`: the owner is the single context that mutates
/// the list, and a page must finish before the next one can be requested.
pub struct Feed {
    catalog: Catalog,
    initial_url: String,
    pending: PageCursor,
    records: Vec<DisplayRecord>,
    prefetch_threshold: usize,
}

impl Feed {
    pub fn new(catalog: Catalog, prefetch_threshold: usize) -> Self {
        let initial_url = catalog.initial_page_url();
        Self::starting_at(catalog, initial_url, prefetch_threshold)
    }

    pub fn starting_at(catalog: Catalog, initial_url: impl Into<String>, prefetch_threshold: usize) -> Self {
        let initial_url = initial_url.into();
        Self {
            catalog,
            pending: PageCursor::new(initial_url.clone()),
            initial_url,
            records: Vec::new(),
            prefetch_threshold: prefetch_threshold.max(1),
        }
    }

    pub fn records(&self) -> &[DisplayRecord] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn has_more(&self) -> bool { !self.pending.is_end() }
    pub fn pending_cursor(&self) -> &PageCursor { &self.pending }

    /// Fetch the pending page and append it. On failure the cursor stays put,
    /// so calling again retries the same page. Returns how many records were added.
    pub async fn request_next_page<O: FeedObserver>(&mut self, observer: &mut O) -> FetchResult<usize> {
        let Some(url) = self.pending.url().map(str::to_string) else {
            debug!("catalog exhausted, nothing to request");
            return Ok(0);
        };

        match self.catalog.fetch_page(&url).await {
            Ok(page) => {
                let start = self.records.len();
                let added = page.records.len();
                let has_more = page.has_more();
                self.records.extend(page.records);
                self.pending = page.next_page;
                info!(added, total = self.records.len(), has_more, "feed extended");
                observer.on_page_loaded(&self.records[start..], has_more);
                Ok(added)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "page failed");
                observer.on_page_failed(&e);
                Err(e)
            }
        }
    }

    /// Clear everything and start over from the first page.
    pub async fn reload<O: FeedObserver>(&mut self, observer: &mut O) -> FetchResult<usize> {
        let dropped = self.catalog.clear_cache();
        debug!(records = self.records.len(), cached_pages = dropped, "reloading feed");
        self.records.clear();
        self.pending = PageCursor::new(self.initial_url.clone());
        self.request_next_page(observer).await
    }

    /// Whether a row at `visible_index` is close enough to the end to load more.
    pub fn should_request_more(&self, visible_index: usize) -> bool {
        self.has_more() && visible_index.saturating_add(self.prefetch_threshold) >= self.records.len()
    }
}
