//! verssion - Tracks stable release versions of software projects
//!
//! This crate mines the infobox tables of Wikipedia articles and provides:
//! - A tolerant HTML table extractor and an infobox resolver
//! - An update engine that appends to a per-page version history only on change
//! - Curated lists of pages composed into feeds
//! - Swappable history backends (in-memory, redb) and fetchers (HTTP, fixtures)
//! - A JSON API over the core operations

pub mod api;
pub mod config;
pub mod curated;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod infobox;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;
use curated::CuratedAggregator;
use engine::UpdateEngine;
use fetch::Fetcher;
use storage::HistoryStore;

pub use error::{Error, ErrorKind};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn HistoryStore>,
    pub engine: Arc<UpdateEngine>,
    pub curated: CuratedAggregator,
}

impl AppState {
    /// Wire the core components around a fetcher and a history store.
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>, store: Arc<dyn HistoryStore>) -> Self {
        let engine = Arc::new(UpdateEngine::new(fetcher, Arc::clone(&store)));
        let curated = CuratedAggregator::new(Arc::clone(&engine), Arc::clone(&store));
        Self {
            config,
            store,
            engine,
            curated,
        }
    }
}
