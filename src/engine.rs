//! Fetch, extract, resolve, and append-on-change.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{Error, ErrorKind};
use crate::extract::extract_tables;
use crate::fetch::Fetcher;
use crate::infobox;
use crate::storage::models::VersionEntry;
use crate::storage::HistoryStore;

pub struct UpdateEngine {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn HistoryStore>,
}

impl UpdateEngine {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn HistoryStore>) -> Self {
        Self { fetcher, store }
    }

    /// Refresh one page and return its canonical key.
    ///
    /// A new history entry is written only when the page has none yet or its
    /// release differs from the latest one; otherwise this is a freshness probe.
    /// Fetch failures leave history untouched.
    pub async fn update(&self, requested: &str) -> Result<String, Error> {
        let fetched = self
            .fetcher
            .fetch(requested)
            .await
            .map_err(|source| Error::Network {
                page: requested.to_string(),
                source,
            })?;

        let tables = extract_tables(&fetched.markup);
        // NotFound names the key the caller asked for, not the redirect target.
        let candidate = infobox::resolve(&tables, &fetched.canonical, Utc::now()).map_err(|_| {
            Error::NotFound {
                page: requested.to_string(),
            }
        })?;

        let latest = self.store.latest(&fetched.canonical).await?;
        match latest {
            Some(prev) if prev.same_release(&candidate) => {
                debug!(page = %fetched.canonical, "stable release unchanged");
            }
            _ => {
                if self.store.append(&candidate).await? {
                    info!(
                        page = %candidate.page,
                        version = %candidate.stable_version,
                        "recorded new stable release"
                    );
                }
            }
        }

        if fetched.canonical != requested {
            debug!(requested, canonical = %fetched.canonical, "page resolved to canonical key");
        }
        Ok(fetched.canonical)
    }

    /// Refresh a page and return its latest entry.
    ///
    /// When the source cannot be reached, previously stored data for the
    /// requested key is served instead of failing.
    pub async fn current(&self, requested: &str) -> Result<VersionEntry, Error> {
        match self.update(requested).await {
            Ok(canonical) => self
                .store
                .latest(&canonical)
                .await?
                .ok_or_else(|| Error::NotFound {
                    page: canonical.clone(),
                }),
            Err(err) if err.kind() == ErrorKind::Network => {
                match self.store.latest(requested).await? {
                    Some(stored) => {
                        warn!(page = requested, error = %err, "source unavailable, serving stored version");
                        Ok(stored)
                    }
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Update each page in turn. Per-page failures are collected, not fatal.
    pub async fn update_all(&self, pages: &[String]) -> (Vec<String>, Vec<Error>) {
        let mut canonical = Vec::new();
        let mut errors = Vec::new();
        for page in pages {
            match self.update(page).await {
                Ok(c) => canonical.push(c),
                Err(err) => {
                    warn!(page = %page, error = %err, "update failed");
                    errors.push(err);
                }
            }
        }
        (canonical, errors)
    }
}
