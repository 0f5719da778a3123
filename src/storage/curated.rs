use chrono::Utc;
use redb::ReadableTable;

use super::db::{Database, StorageError};
use super::models::{self, Curated};
use super::tables::*;

impl Database {
    // ========================================================================
    // Curated lists
    // ========================================================================

    /// Create an empty curated list and return its id
    pub fn insert_curated(&self) -> Result<String, StorageError> {
        let curated = Curated::new(uuid::Uuid::new_v4().to_string(), Utc::now());

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(CURATED)?;
            let data = rmp_serde::to_vec_named(&curated)?;
            table.insert(curated.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(curated.id)
    }

    pub fn get_curated(&self, id: &str) -> Result<Option<Curated>, StorageError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(CURATED)?;

        match table.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// Pages and title of a list written in one transaction; a new list is
    /// created when `id` is `None`
    pub fn write_curated(
        &self,
        id: Option<&str>,
        pages: &[String],
        title: &str,
    ) -> Result<String, StorageError> {
        let now = Utc::now();

        let write_txn = self.begin_write()?;
        let id = {
            let mut table = write_txn.open_table(CURATED)?;
            let mut curated: Curated = match id {
                Some(id) => match table.get(id)? {
                    Some(data) => rmp_serde::from_slice(data.value())?,
                    None => return Err(StorageError::CuratedNotFound(id.to_string())),
                },
                None => Curated::new(uuid::Uuid::new_v4().to_string(), now),
            };

            curated.pages = super::page_set(pages);
            curated.custom_title = models::custom_title(title);
            curated.last_updated = now;

            let data = rmp_serde::to_vec_named(&curated)?;
            table.insert(curated.id.as_str(), data.as_slice())?;
            curated.id
        };
        write_txn.commit()?;
        Ok(id)
    }

    pub fn set_curated_pages(&self, id: &str, pages: &[String]) -> Result<(), StorageError> {
        self.update_curated(id, |cur| {
            cur.pages = super::page_set(pages);
            cur.last_updated = Utc::now();
        })
    }

    pub fn set_curated_title(&self, id: &str, title: &str) -> Result<(), StorageError> {
        self.update_curated(id, |cur| cur.custom_title = models::custom_title(title))
    }

    pub fn set_curated_used(&self, id: &str) -> Result<(), StorageError> {
        self.update_curated(id, |cur| cur.used_at = Some(Utc::now()))
    }

    /// Read-modify-write of one curated list in a single write transaction
    fn update_curated(
        &self,
        id: &str,
        apply: impl FnOnce(&mut Curated),
    ) -> Result<(), StorageError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(CURATED)?;
            let mut curated: Curated = match table.get(id)? {
                Some(data) => rmp_serde::from_slice(data.value())?,
                None => return Err(StorageError::CuratedNotFound(id.to_string())),
            };

            apply(&mut curated);

            let data = rmp_serde::to_vec_named(&curated)?;
            table.insert(id, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
