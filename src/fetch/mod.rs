mod memory;
mod wikipedia;

pub use memory::{MemoryFetcher, NotFetcher};
pub use wikipedia::WikipediaFetcher;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("updates are disabled")]
    Disabled,
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// A fetched article and the key the source considers canonical for it.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub markup: Bytes,
    /// Equal to the requested key when the source did not redirect.
    pub canonical: String,
}

/// Abstraction over the source of article markup.
/// Implementations own timeouts and transport policy.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, page: &str) -> Result<Fetched, FetchError>;
}
