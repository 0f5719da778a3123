use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::infobox;

/// One observed release of a page. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub page: String,
    /// Cell text as found, line breaks included.
    pub stable_version: String,
    #[serde(default)]
    pub homepage: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl VersionEntry {
    /// Same release as far as change detection is concerned.
    pub fn same_release(&self, other: &VersionEntry) -> bool {
        self.stable_version == other.stable_version && self.homepage == other.homepage
    }
}

/// A user-composed list of pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curated {
    pub id: String,
    /// Sorted, without duplicates.
    pub pages: Vec<String>,
    #[serde(default)]
    pub custom_title: Option<String>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,
}

impl Curated {
    pub fn new(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            pages: Vec::new(),
            custom_title: None,
            last_updated: now,
            used_at: None,
        }
    }

    pub fn title(&self) -> String {
        match &self.custom_title {
            Some(t) => t.clone(),
            None => self.default_title(),
        }
    }

    /// Page titles joined with commas.
    pub fn default_title(&self) -> String {
        if self.pages.is_empty() {
            return "empty list".to_string();
        }
        infobox::titles(&self.pages).join(", ")
    }
}

/// Normalize a user-supplied title; blank means "no custom title".
pub(crate) fn custom_title(title: &str) -> Option<String> {
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}
