//! Feed composition from stored history.
//!
//! Entry ids are derived only from the page and the version text, so the
//! same release always maps to the same id, across restarts and machines.
//! Feed readers rely on that to deduplicate.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::infobox;
use crate::storage::models::VersionEntry;

/// Placeholder for "no known previous version".
const UNKNOWN_PREVIOUS: &str = "?";

pub const FEED_AUTHOR: &str = "Wikipedia";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub id: String,
    pub page: String,
    pub title: String,
    pub updated: DateTime<Utc>,
    /// `"<previous> -> <new>"`
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feed {
    pub id: String,
    pub title: String,
    pub updated: Option<DateTime<Utc>>,
    pub author: String,
    pub links: Vec<Link>,
    pub entries: Vec<FeedEntry>,
}

/// Stable id of one release of one page.
///
/// Page keys never contain whitespace, so the newline keeps the
/// (page, version) pair unambiguous.
pub fn entry_id(page: &str, version: &str) -> String {
    urn(&format!("{page}\n{version}"))
}

/// `urn:uuid:` name derived deterministically from `name`.
pub fn urn(name: &str) -> String {
    format!(
        "urn:uuid:{}",
        Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes())
    )
}

/// One entry per history record, in history order. Each entry describes the
/// transition from the previous record of the same page.
pub fn compose_entries(history: &[VersionEntry]) -> Vec<FeedEntry> {
    let mut previous: HashMap<&str, &str> = HashMap::new();
    history
        .iter()
        .map(|v| {
            let prev = previous
                .insert(v.page.as_str(), v.stable_version.as_str())
                .unwrap_or(UNKNOWN_PREVIOUS);
            FeedEntry {
                id: entry_id(&v.page, &v.stable_version),
                page: v.page.clone(),
                title: format!("{}: {}", infobox::title(&v.page), v.stable_version),
                updated: v.fetched_at,
                content: format!("{prev} -> {}", v.stable_version),
            }
        })
        .collect()
}

/// Build a feed. Its update time is the later of `last_known` and the
/// newest entry.
pub fn compose_feed(
    id: String,
    title: String,
    last_known: Option<DateTime<Utc>>,
    history: &[VersionEntry],
) -> Feed {
    let entries = compose_entries(history);
    let newest = entries.iter().map(|e| e.updated).max();
    Feed {
        id,
        title,
        updated: newest.max(last_known),
        author: FEED_AUTHOR.to_string(),
        links: Vec::new(),
        entries,
    }
}
