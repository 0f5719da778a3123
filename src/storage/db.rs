use async_trait::async_trait;
use redb::{Database as RedbDatabase, ReadTransaction, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::models::{Curated, VersionEntry};
use super::tables::*;
use super::HistoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Curated list not found: {0}")]
    CuratedNotFound(String),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
}

impl From<redb::CommitError> for StorageError {
    fn from(e: redb::CommitError) -> Self {
        StorageError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for StorageError {
    fn from(e: redb::DatabaseError) -> Self {
        StorageError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::StorageError> for StorageError {
    fn from(e: redb::StorageError) -> Self {
        StorageError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for StorageError {
    fn from(e: redb::TableError) -> Self {
        StorageError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for StorageError {
    fn from(e: redb::TransactionError) -> Self {
        StorageError::Transaction(Box::new(e))
    }
}

/// Durable history store on an embedded redb file.
///
/// redb admits one write transaction at a time, which makes the
/// read-compare-append of [`Database::append_version`] atomic.
pub struct Database {
    db: Arc<RedbDatabase>,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("verssion.redb");
        let db = Arc::new(RedbDatabase::create(db_path)?);

        // Initialize application tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(HISTORY)?;
            let _ = write_txn.open_table(CURATED)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, StorageError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, StorageError> {
        Ok(self.db.begin_write()?)
    }
}

#[async_trait]
impl HistoryStore for Database {
    async fn latest(&self, page: &str) -> Result<Option<VersionEntry>, StorageError> {
        self.latest_version(page)
    }

    async fn append(&self, entry: &VersionEntry) -> Result<bool, StorageError> {
        self.append_version(entry)
    }

    async fn history(&self, pages: &[String]) -> Result<Vec<VersionEntry>, StorageError> {
        self.merged_history(pages)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<VersionEntry>, StorageError> {
        self.recent_versions(limit)
    }

    async fn known(&self) -> Result<Vec<String>, StorageError> {
        self.known_pages()
    }

    async fn create_curated(&self) -> Result<String, StorageError> {
        self.insert_curated()
    }

    async fn load_curated(&self, id: &str) -> Result<Option<Curated>, StorageError> {
        self.get_curated(id)
    }

    async fn save_curated(
        &self,
        id: Option<&str>,
        pages: &[String],
        title: &str,
    ) -> Result<String, StorageError> {
        self.write_curated(id, pages, title)
    }

    async fn curated_set_pages(&self, id: &str, pages: &[String]) -> Result<(), StorageError> {
        self.set_curated_pages(id, pages)
    }

    async fn curated_set_title(&self, id: &str, title: &str) -> Result<(), StorageError> {
        self.set_curated_title(id, title)
    }

    async fn curated_set_used(&self, id: &str) -> Result<(), StorageError> {
        self.set_curated_used(id)
    }
}
