//! Locating the release fields of an article infobox.

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::extract::{Row, Table};
use crate::storage::models::VersionEntry;

/// Row labels holding the current stable version.
const STABLE_RELEASE_LABELS: &[&str] = &["stable release", "stable releases"];

/// Row labels holding the project homepage.
const HOMEPAGE_LABELS: &[&str] = &["website"];

/// Fields found in the first infobox that carries a stable release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Infobox {
    pub stable_version: String,
    pub homepage: Option<String>,
}

/// Scan tables (and their rows) in document order; the first stable release
/// row wins. The homepage is looked up in that same table.
pub fn find_infobox(tables: &[Table]) -> Option<Infobox> {
    tables.iter().find_map(|table| {
        let stable_version = find_field(&table.rows, STABLE_RELEASE_LABELS)?;
        let homepage = find_field(&table.rows, HOMEPAGE_LABELS)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());
        Some(Infobox {
            stable_version: stable_version.to_string(),
            homepage,
        })
    })
}

/// Build the candidate history entry for `page` or report NotFound.
pub fn resolve(
    tables: &[Table],
    page: &str,
    fetched_at: DateTime<Utc>,
) -> Result<VersionEntry, Error> {
    let infobox = find_infobox(tables).ok_or_else(|| Error::NotFound {
        page: page.to_string(),
    })?;
    Ok(VersionEntry {
        page: page.to_string(),
        stable_version: infobox.stable_version,
        homepage: infobox.homepage,
        fetched_at,
    })
}

fn find_field<'a>(rows: &'a [Row], labels: &[&str]) -> Option<&'a str> {
    rows.iter()
        .find(|row| row.len() >= 2 && is_label(&row[0], labels))
        .map(|row| row[1].as_str())
}

/// Case-insensitive label match, ignoring surrounding and repeated whitespace
/// (infobox labels often carry non-breaking spaces).
fn is_label(cell: &str, labels: &[&str]) -> bool {
    let normalized = cell.split_whitespace().collect::<Vec<_>>().join(" ");
    labels.iter().any(|l| normalized.eq_ignore_ascii_case(l))
}

/// Display title of a page key.
pub fn title(page: &str) -> String {
    page.replace('_', " ")
}

/// Display titles of several page keys.
pub fn titles(pages: &[String]) -> Vec<String> {
    pages.iter().map(|p| title(p)).collect()
}
