use redb::ReadableTable;

use super::db::{Database, StorageError};
use super::models::VersionEntry;
use super::tables::*;

impl Database {
    // ========================================================================
    // Version history
    // ========================================================================

    /// Full history of one page, oldest first
    pub fn page_history(&self, page: &str) -> Result<Vec<VersionEntry>, StorageError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(HISTORY)?;

        match table.get(page)? {
            Some(data) => Ok(rmp_serde::from_slice(data.value())?),
            None => Ok(Vec::new()),
        }
    }

    pub fn latest_version(&self, page: &str) -> Result<Option<VersionEntry>, StorageError> {
        Ok(self.page_history(page)?.pop())
    }

    /// Append an entry unless it repeats the latest release of its page.
    /// The check and the write share one write transaction.
    pub fn append_version(&self, entry: &VersionEntry) -> Result<bool, StorageError> {
        debug_assert!(!entry.page.is_empty(), "page must not be empty");

        let write_txn = self.begin_write()?;
        let appended = {
            let mut table = write_txn.open_table(HISTORY)?;
            let mut entries: Vec<VersionEntry> = match table.get(entry.page.as_str())? {
                Some(data) => rmp_serde::from_slice(data.value())?,
                None => Vec::new(),
            };

            if super::is_new_release(entries.last(), entry) {
                entries.push(entry.clone());
                let data = rmp_serde::to_vec_named(&entries)?;
                table.insert(entry.page.as_str(), data.as_slice())?;
                true
            } else {
                false
            }
        };
        write_txn.commit()?;
        Ok(appended)
    }

    /// Histories of several pages read in one transaction, merged chronologically
    pub fn merged_history(&self, pages: &[String]) -> Result<Vec<VersionEntry>, StorageError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(HISTORY)?;

        let mut per_page = Vec::new();
        for page in super::distinct(pages) {
            if let Some(data) = table.get(page)? {
                let entries: Vec<VersionEntry> = rmp_serde::from_slice(data.value())?;
                per_page.push(entries);
            }
        }

        Ok(super::merge_histories(per_page))
    }

    /// Latest entry of every page, newest first
    pub fn recent_versions(&self, limit: usize) -> Result<Vec<VersionEntry>, StorageError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(HISTORY)?;

        let mut latest = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let mut entries: Vec<VersionEntry> = rmp_serde::from_slice(value.value())?;
            if let Some(entry) = entries.pop() {
                latest.push(entry);
            }
        }

        Ok(super::most_recent(latest, limit))
    }

    /// Every page with history, sorted
    pub fn known_pages(&self) -> Result<Vec<String>, StorageError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(HISTORY)?;

        // redb iterates keys in order
        table
            .iter()?
            .map(|r| r.map(|(k, _)| k.value().to_string()).map_err(Into::into))
            .collect()
    }
}
