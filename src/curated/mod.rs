//! Curated lists: resolving user input into canonical pages, persisting
//! lists all-or-nothing, and composing feeds from stored history.

pub mod feed;
pub mod pages;

use std::sync::Arc;

use tracing::{info, warn};

pub use feed::{compose_feed, entry_id, Feed, FeedEntry, Link};
pub use pages::{parse_page_line, parse_pages, unique};

use crate::engine::UpdateEngine;
use crate::error::{Error, ErrorKind};
use crate::infobox;
use crate::storage::models::Curated;
use crate::storage::HistoryStore;

/// Outcome of resolving a set of user-supplied page references.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Canonical keys that resolved, sorted and deduplicated.
    pub pages: Vec<String>,
    /// One error per rejected line or failed page.
    pub errors: Vec<Error>,
}

impl Resolution {
    /// Only a clean resolution with at least one page may be saved.
    pub fn is_acceptable(&self) -> bool {
        self.errors.is_empty() && !self.pages.is_empty()
    }
}

/// Result of a save attempt. Nothing is written unless `Saved`.
#[derive(Debug)]
pub enum Persisted {
    Saved(String),
    Rejected(Vec<Error>),
    NothingSelected,
}

pub struct CuratedAggregator {
    engine: Arc<UpdateEngine>,
    store: Arc<dyn HistoryStore>,
}

impl CuratedAggregator {
    pub fn new(engine: Arc<UpdateEngine>, store: Arc<dyn HistoryStore>) -> Self {
        Self { engine, store }
    }

    /// Validate and canonicalize free text (one page per line) together with
    /// explicitly selected pages. Every candidate is updated; a failing
    /// candidate adds an error without blocking the others. Storage failures
    /// abort the whole resolution.
    pub async fn resolve_input(
        &self,
        free_text: &str,
        selected: &[String],
    ) -> Result<Resolution, Error> {
        let (mut candidates, mut errors) = parse_pages(free_text);
        candidates.extend(selected.iter().cloned());

        let mut resolved = Vec::new();
        for page in unique(candidates) {
            match self.engine.update(&page).await {
                Ok(canonical) => resolved.push(canonical),
                Err(err) if err.kind() == ErrorKind::Storage => return Err(err),
                Err(err) => {
                    warn!(page = %page, error = %err, "page rejected");
                    errors.push(err);
                }
            }
        }

        Ok(Resolution {
            pages: unique(resolved),
            errors,
        })
    }

    /// Create a new curated list from a resolution, all-or-nothing.
    pub async fn create(&self, resolution: Resolution) -> Result<Persisted, Error> {
        if let Some(rejected) = rejection(resolution.errors, &resolution.pages) {
            return Ok(rejected);
        }

        let id = self.store.save_curated(None, &resolution.pages, "").await?;
        info!(id = %id, pages = resolution.pages.len(), "created curated list");
        Ok(Persisted::Saved(id))
    }

    /// Replace the pages and title of an existing list, all-or-nothing.
    pub async fn edit(
        &self,
        id: &str,
        resolution: Resolution,
        title: &str,
    ) -> Result<Persisted, Error> {
        if let Some(rejected) = rejection(resolution.errors, &resolution.pages) {
            return Ok(rejected);
        }

        self.store
            .save_curated(Some(id), &resolution.pages, title)
            .await?;
        info!(id, pages = resolution.pages.len(), "updated curated list");
        Ok(Persisted::Saved(id.to_string()))
    }

    /// Feed of a curated list. Its pages are refreshed first; the list is
    /// marked as used afterwards.
    pub async fn curated_feed(&self, curated: &Curated) -> Result<Feed, Error> {
        let pages = self.refresh(&curated.pages).await?;
        let history = self.store.history(&pages).await?;
        let feed = compose_feed(
            format!("urn:uuid:{}", curated.id),
            curated.title(),
            Some(curated.last_updated),
            &history,
        );

        if let Err(e) = self.store.curated_set_used(&curated.id).await {
            warn!(id = %curated.id, error = %e, "failed to mark curated list used");
        }
        Ok(feed)
    }

    /// Feed of an arbitrary page set, nothing persisted.
    pub async fn adhoc_feed(&self, pages: &[String]) -> Result<Feed, Error> {
        let pages = self.refresh(&unique(pages.to_vec())).await?;
        let history = self.store.history(&pages).await?;
        Ok(compose_feed(
            feed::urn(&pages.join(",")),
            infobox::titles(&pages).join(", "),
            None,
            &history,
        ))
    }

    /// Update pages and return the keys whose stored history a feed shows:
    /// the canonical key on success, the requested key when only the source
    /// is unreachable. Pages without a stable release are left out.
    async fn refresh(&self, pages: &[String]) -> Result<Vec<String>, Error> {
        let (mut keys, errors) = self.engine.update_all(pages).await;
        for err in errors {
            match err.kind() {
                ErrorKind::Network => keys.extend(err.subject().map(str::to_string)),
                ErrorKind::Storage => return Err(err),
                ErrorKind::NotFound | ErrorKind::Validation => {}
            }
        }
        Ok(unique(keys))
    }
}

fn rejection(errors: Vec<Error>, pages: &[String]) -> Option<Persisted> {
    if !errors.is_empty() {
        return Some(Persisted::Rejected(errors));
    }
    pages.is_empty().then_some(Persisted::NothingSelected)
}
