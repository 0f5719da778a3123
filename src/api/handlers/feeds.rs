use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::encode_page;
use crate::api::response::{ApiError, AppQuery, JSend};
use crate::curated::{Feed, Link};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AdhocParams {
    /// Comma-separated page keys
    #[serde(default)]
    pub p: String,
}

fn link(href: String, rel: &str, content_type: &str) -> Link {
    Link {
        href,
        rel: rel.to_string(),
        content_type: content_type.to_string(),
    }
}

/// Feed of a single page; 404 when nothing is known about it.
pub async fn page_feed(
    State(state): State<Arc<AppState>>,
    Path(page): Path<String>,
) -> Result<Json<JSend<Feed>>, ApiError> {
    let mut feed = state.curated.adhoc_feed(std::slice::from_ref(&page)).await?;
    // Entries carry the canonical key, which differs from `page` for aliases.
    let Some(canonical) = feed.entries.first().map(|e| encode_page(&e.page)) else {
        return Err(ApiError::not_found(format!("No history for page: {page}")));
    };

    let base = &state.config.server.base_url;
    feed.links = vec![
        link(format!("{base}/p/{canonical}"), "alternate", "text/html"),
        link(
            format!("{base}/p/{canonical}/feed"),
            "self",
            "application/json",
        ),
    ];
    Ok(JSend::success(feed))
}

/// Feed of the pages in `?p=A,B,C`.
pub async fn adhoc_feed(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<AdhocParams>,
) -> Result<Json<JSend<Feed>>, ApiError> {
    let pages: Vec<String> = params
        .p
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    if pages.is_empty() {
        return Err(ApiError::bad_request("At least one page is required"));
    }

    let mut feed = state.curated.adhoc_feed(&pages).await?;
    let query: Vec<String> = pages.iter().map(|p| encode_page(p)).collect();
    feed.links = vec![link(
        format!(
            "{}/adhoc/feed?p={}",
            state.config.server.base_url,
            query.join(",")
        ),
        "self",
        "application/json",
    )];
    Ok(JSend::success(feed))
}

/// Feed of a curated list.
pub async fn curated_feed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<Feed>>, ApiError> {
    let curated = state
        .store
        .load_curated(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Curated list not found"))?;

    let mut feed = state.curated.curated_feed(&curated).await?;
    let base = &state.config.server.base_url;
    feed.links = vec![
        link(format!("{base}/curated/{id}"), "alternate", "text/html"),
        link(format!("{base}/curated/{id}/feed"), "self", "application/json"),
    ];
    Ok(JSend::success(feed))
}
