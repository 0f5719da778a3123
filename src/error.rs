use serde::Serialize;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::storage::StorageError;

/// The four failure classes every core operation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Fetch or transport failure. Retried only on the next call.
    Network,
    /// Content was fetched but carries no recognizable stable release.
    NotFound,
    /// Malformed user-supplied page reference, scoped to one line.
    Validation,
    /// Persistence failure. The operation was aborted.
    Storage,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("fetch {page:?}: {source}")]
    Network {
        page: String,
        #[source]
        source: FetchError,
    },
    #[error("no stable release found for {page:?}")]
    NotFound { page: String },
    #[error("invalid page: {line:?}")]
    Validation { line: String },
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network { .. } => ErrorKind::Network,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Storage(_) => ErrorKind::Storage,
        }
    }

    /// The page (or input line) the error is about, if it is scoped to one.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Error::Network { page, .. } | Error::NotFound { page } => Some(page),
            Error::Validation { line } => Some(line),
            Error::Storage(_) => None,
        }
    }
}
