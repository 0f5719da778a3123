pub mod db;
mod curated;
mod history;
pub mod memory;
pub mod models;
mod tables;

pub use db::{Database, StorageError};
pub use memory::MemoryStore;
pub use tables::*;

use async_trait::async_trait;

use models::{Curated, VersionEntry};

/// Persistence of version histories and curated lists.
///
/// `append` is the one operation with a consistency contract: the
/// read-latest-then-append must be atomic per page, so two racing appends of
/// the same release leave a single entry behind.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Most recent entry of `page`.
    async fn latest(&self, page: &str) -> Result<Option<VersionEntry>, StorageError>;

    /// Append `entry` unless it repeats the page's latest release.
    /// Returns whether a record was written.
    async fn append(&self, entry: &VersionEntry) -> Result<bool, StorageError>;

    /// History of all `pages`, merged in chronological order.
    async fn history(&self, pages: &[String]) -> Result<Vec<VersionEntry>, StorageError>;

    /// Latest entry per page, most recently updated first.
    async fn recent(&self, limit: usize) -> Result<Vec<VersionEntry>, StorageError>;

    /// All pages with at least one entry, sorted.
    async fn known(&self) -> Result<Vec<String>, StorageError>;

    async fn create_curated(&self) -> Result<String, StorageError>;

    /// `Ok(None)` for an unknown id.
    async fn load_curated(&self, id: &str) -> Result<Option<Curated>, StorageError>;

    /// Write the pages and title of a curated list in one step, creating the
    /// list when `id` is `None`. Returns the list id. An empty title clears
    /// the custom title.
    async fn save_curated(
        &self,
        id: Option<&str>,
        pages: &[String],
        title: &str,
    ) -> Result<String, StorageError>;

    async fn curated_set_pages(&self, id: &str, pages: &[String]) -> Result<(), StorageError>;

    /// An empty title clears the custom title.
    async fn curated_set_title(&self, id: &str, title: &str) -> Result<(), StorageError>;

    async fn curated_set_used(&self, id: &str) -> Result<(), StorageError>;
}

/// Whether `entry` may follow `latest` in a page history.
pub(crate) fn is_new_release(latest: Option<&VersionEntry>, entry: &VersionEntry) -> bool {
    latest.is_none_or(|prev| !prev.same_release(entry))
}

/// Merge per-page histories into one chronological list.
/// Ties keep the order in which pages were requested.
pub(crate) fn merge_histories(per_page: Vec<Vec<VersionEntry>>) -> Vec<VersionEntry> {
    let mut merged: Vec<VersionEntry> = per_page.into_iter().flatten().collect();
    merged.sort_by_key(|e| e.fetched_at);
    merged
}

/// Newest-first latest entries, cut to `limit`.
pub(crate) fn most_recent(mut latest: Vec<VersionEntry>, limit: usize) -> Vec<VersionEntry> {
    latest.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at).then_with(|| a.page.cmp(&b.page)));
    latest.truncate(limit);
    latest
}

/// Requested pages without repeats, first occurrence kept.
pub(crate) fn distinct(pages: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    pages
        .iter()
        .map(String::as_str)
        .filter(|p| seen.insert(*p))
        .collect()
}

/// Sorted, deduplicated page set as stored on a curated list.
pub(crate) fn page_set(pages: &[String]) -> Vec<String> {
    let mut set = pages.to_vec();
    set.sort();
    set.dedup();
    set
}
