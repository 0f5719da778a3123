//! In-memory history store.
//!
//! Not durable: everything is lost on restart. Used for tests and for
//! deployments that only need a warm cache of the source. All mutations take
//! the single write lock, so a page's read-compare-append is atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::db::StorageError;
use super::models::{self, Curated, VersionEntry};
use super::HistoryStore;

#[derive(Default)]
struct Inner {
    history: HashMap<String, Vec<VersionEntry>>,
    curated: HashMap<String, Curated>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update_curated(
        &self,
        id: &str,
        apply: impl FnOnce(&mut Curated) + Send,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        let curated = inner
            .curated
            .get_mut(id)
            .ok_or_else(|| StorageError::CuratedNotFound(id.to_string()))?;
        apply(curated);
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn latest(&self, page: &str) -> Result<Option<VersionEntry>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner.history.get(page).and_then(|h| h.last()).cloned())
    }

    async fn append(&self, entry: &VersionEntry) -> Result<bool, StorageError> {
        let mut inner = self.inner.write().await;
        let history = inner.history.entry(entry.page.clone()).or_default();
        if !super::is_new_release(history.last(), entry) {
            return Ok(false);
        }
        history.push(entry.clone());
        Ok(true)
    }

    async fn history(&self, pages: &[String]) -> Result<Vec<VersionEntry>, StorageError> {
        let inner = self.inner.read().await;
        let per_page = super::distinct(pages)
            .into_iter()
            .filter_map(|p| inner.history.get(p).cloned())
            .collect();
        Ok(super::merge_histories(per_page))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<VersionEntry>, StorageError> {
        let inner = self.inner.read().await;
        let latest = inner
            .history
            .values()
            .filter_map(|h| h.last().cloned())
            .collect();
        Ok(super::most_recent(latest, limit))
    }

    async fn known(&self) -> Result<Vec<String>, StorageError> {
        let inner = self.inner.read().await;
        let mut pages: Vec<String> = inner
            .history
            .iter()
            .filter(|(_, h)| !h.is_empty())
            .map(|(p, _)| p.clone())
            .collect();
        pages.sort();
        Ok(pages)
    }

    async fn create_curated(&self) -> Result<String, StorageError> {
        let curated = Curated::new(uuid::Uuid::new_v4().to_string(), Utc::now());
        let id = curated.id.clone();
        self.inner.write().await.curated.insert(id.clone(), curated);
        Ok(id)
    }

    async fn load_curated(&self, id: &str) -> Result<Option<Curated>, StorageError> {
        Ok(self.inner.read().await.curated.get(id).cloned())
    }

    async fn save_curated(
        &self,
        id: Option<&str>,
        pages: &[String],
        title: &str,
    ) -> Result<String, StorageError> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let curated = match id {
            Some(id) => inner
                .curated
                .get_mut(id)
                .ok_or_else(|| StorageError::CuratedNotFound(id.to_string()))?,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                inner
                    .curated
                    .entry(id.clone())
                    .or_insert(Curated::new(id, now))
            }
        };

        curated.pages = super::page_set(pages);
        curated.custom_title = models::custom_title(title);
        curated.last_updated = now;
        Ok(curated.id.clone())
    }

    async fn curated_set_pages(&self, id: &str, pages: &[String]) -> Result<(), StorageError> {
        let pages = super::page_set(pages);
        self.update_curated(id, move |cur| {
            cur.pages = pages;
            cur.last_updated = Utc::now();
        })
        .await
    }

    async fn curated_set_title(&self, id: &str, title: &str) -> Result<(), StorageError> {
        let title = models::custom_title(title);
        self.update_curated(id, move |cur| cur.custom_title = title)
            .await
    }

    async fn curated_set_used(&self, id: &str) -> Result<(), StorageError> {
        self.update_curated(id, |cur| cur.used_at = Some(Utc::now()))
            .await
    }
}
