pub mod assembler;
pub mod catalog;
pub mod config;
pub mod entity;
pub mod error;
pub mod feed;
pub mod http;
pub mod images;
pub mod record;
pub mod storage;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::catalog::{Catalog, Page};
    pub use crate::config::Config;
    pub use crate::entity::{Entity, EntityKind};
    pub use crate::error::FetchError;
    pub use crate::feed::{Feed, FeedObserver};
    pub use crate::images::Bitmap;
    pub use crate::record::{DisplayRecord, PageCursor, RosterItem, RosterTab};
    pub use crate::VodClient;
}

use anyhow::{Context, Result};

use crate::catalog::{Catalog, Page};
use crate::config::Config;
use crate::entity::{Entity, EntityKind};
use crate::feed::Feed;
use crate::http::HttpClient;

/// Entry point for embedders. Owns the fetch client and a catalog built on it.
pub struct VodClient {
    config: Config,
    catalog: Catalog,
}

impl VodClient {
    /// Build the production HTTP stack from `config`. Does not touch the network.
    pub fn connect(config: Config) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::from_config(&config).context("building HTTP client")?;
        Ok(Self::with_http(config, http))
    }

    /// Use a caller-supplied client (custom transport, shared limiter).
    pub fn with_http(config: Config, http: HttpClient) -> Self {
        let catalog = Catalog::new(http, &config);
        Self { config, catalog }
    }

    pub fn config(&self) -> &Config { &self.config }
    pub fn catalog(&self) -> &Catalog { &self.catalog }

    /// A fresh feed starting at the first catalog page.
    pub fn feed(&self) -> Feed {
        Feed::new(self.catalog.clone(), self.config.prefetch_threshold)
    }

    pub async fn fetch_page(&self, url: Option<&str>, refresh: bool) -> Result<Page> {
        let url = match url {
            Some(u) => u.to_string(),
            None => self.catalog.initial_page_url(),
        };
        self.catalog
            .fetch_page_with_refresh(&url, refresh)
            .await
            .with_context(|| format!("fetching page {url}"))
    }

    pub async fn resolve_entity(&self, kind: EntityKind, id: u64) -> Result<Entity> {
        self.catalog
            .resolver()
            .resolve(kind, id)
            .await
            .with_context(|| format!("resolving {kind} {id}"))
    }
}
