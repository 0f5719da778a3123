//! Shared test helpers for in-crate tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::curated::CuratedAggregator;
use crate::engine::UpdateEngine;
use crate::fetch::MemoryFetcher;
use crate::storage::models::{Curated, VersionEntry};
use crate::storage::{HistoryStore, MemoryStore, StorageError};

/// Article markup with an infobox in the second table, as on real pages.
pub fn infobox_page(version: &str, homepage: Option<&str>) -> String {
    let website = homepage
        .map(|h| format!("<tr><th>Website</th><td><a href=\"https://{h}\">{h}</a></td></tr>"))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html><html><head><title>t</title></head><body>\
         <table class=\"navbox\"><tr><td>navigation</td></tr></table>\
         <table class=\"infobox\">\
         <tr><th>Developer(s)</th><td>Someone</td></tr>\
         <tr><th>Stable release</th><td>{version}</td></tr>\
         {website}\
         </table></body></html>"
    )
}

/// Core components wired to an in-memory fetcher and store.
pub struct TestBed {
    pub fetcher: Arc<MemoryFetcher>,
    pub store: Arc<MemoryStore>,
    pub engine: Arc<UpdateEngine>,
    pub curated: CuratedAggregator,
}

impl TestBed {
    pub fn new() -> Self {
        let fetcher = Arc::new(MemoryFetcher::new());
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(UpdateEngine::new(fetcher.clone(), store.clone()));
        let curated = CuratedAggregator::new(Arc::clone(&engine), store.clone());
        Self {
            fetcher,
            store,
            engine,
            curated,
        }
    }
}

/// A [`MemoryStore`] whose reads or writes can be switched to fail.
/// `inner` stays reachable so tests can check what was written.
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::Relaxed);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::Relaxed);
    }

    fn read(&self) -> Result<(), StorageError> {
        check(&self.fail_reads)
    }

    fn write(&self) -> Result<(), StorageError> {
        check(&self.fail_writes)
    }
}

fn check(flag: &AtomicBool) -> Result<(), StorageError> {
    if flag.load(Ordering::Relaxed) {
        return Err(StorageError::Io(std::io::Error::other("disk unavailable")));
    }
    Ok(())
}

#[async_trait]
impl HistoryStore for FailingStore {
    async fn latest(&self, page: &str) -> Result<Option<VersionEntry>, StorageError> {
        self.read()?;
        self.inner.latest(page).await
    }

    async fn append(&self, entry: &VersionEntry) -> Result<bool, StorageError> {
        self.write()?;
        self.inner.append(entry).await
    }

    async fn history(&self, pages: &[String]) -> Result<Vec<VersionEntry>, StorageError> {
        self.read()?;
        self.inner.history(pages).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<VersionEntry>, StorageError> {
        self.read()?;
        self.inner.recent(limit).await
    }

    async fn known(&self) -> Result<Vec<String>, StorageError> {
        self.read()?;
        self.inner.known().await
    }

    async fn create_curated(&self) -> Result<String, StorageError> {
        self.write()?;
        self.inner.create_curated().await
    }

    async fn load_curated(&self, id: &str) -> Result<Option<Curated>, StorageError> {
        self.read()?;
        self.inner.load_curated(id).await
    }

    async fn save_curated(
        &self,
        id: Option<&str>,
        pages: &[String],
        title: &str,
    ) -> Result<String, StorageError> {
        self.write()?;
        self.inner.save_curated(id, pages, title).await
    }

    async fn curated_set_pages(&self, id: &str, pages: &[String]) -> Result<(), StorageError> {
        self.write()?;
        self.inner.curated_set_pages(id, pages).await
    }

    async fn curated_set_title(&self, id: &str, title: &str) -> Result<(), StorageError> {
        self.write()?;
        self.inner.curated_set_title(id, title).await
    }

    async fn curated_set_used(&self, id: &str) -> Result<(), StorageError> {
        self.write()?;
        self.inner.curated_set_used(id).await
    }
}
