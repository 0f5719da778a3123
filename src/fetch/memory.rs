use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::{FetchError, Fetched, Fetcher};

/// Markup served for pages the fixture set does not know.
const MISSING_PAGE: &str = "<html><body><p>Wikipedia does not have an article with this exact name.</p></body></html>";

/// In-memory fetcher serving fixture pages, for development and testing.
#[derive(Default)]
pub struct MemoryFetcher {
    pages: RwLock<HashMap<String, String>>,
    redirects: RwLock<HashMap<String, String>>,
    failing: RwLock<HashSet<String>>,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `markup` for `page`, replacing what was there.
    pub async fn set_page(&self, page: &str, markup: impl Into<String>) {
        self.pages
            .write()
            .await
            .insert(page.to_string(), markup.into());
    }

    /// Make `alias` resolve to `canonical`.
    pub async fn set_redirect(&self, alias: &str, canonical: &str) {
        self.redirects
            .write()
            .await
            .insert(alias.to_string(), canonical.to_string());
    }

    /// Fail every fetch of `page` until [`MemoryFetcher::recover`] is called.
    pub async fn fail(&self, page: &str) {
        self.failing.write().await.insert(page.to_string());
    }

    pub async fn recover(&self, page: &str) {
        self.failing.write().await.remove(page);
    }

    /// Number of fetches attempted so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, page: &str) -> Result<Fetched, FetchError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        if self.failing.read().await.contains(page) {
            return Err(FetchError::Unavailable(format!("{page} is unreachable")));
        }

        let canonical = self
            .redirects
            .read()
            .await
            .get(page)
            .cloned()
            .unwrap_or_else(|| page.to_string());

        let markup = self
            .pages
            .read()
            .await
            .get(&canonical)
            .cloned()
            .unwrap_or_else(|| MISSING_PAGE.to_string());

        Ok(Fetched {
            markup: Bytes::from(markup),
            canonical,
        })
    }
}

/// Fetcher used when updates are switched off: only stored history is served.
pub struct NotFetcher;

#[async_trait]
impl Fetcher for NotFetcher {
    async fn fetch(&self, _page: &str) -> Result<Fetched, FetchError> {
        Err(FetchError::Disabled)
    }
}
