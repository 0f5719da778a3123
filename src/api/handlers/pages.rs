use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::encode_page;
use crate::api::response::{ApiError, AppQuery, JSend};
use crate::error::ErrorKind;
use crate::infobox;
use crate::storage::models::VersionEntry;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub page: String,
    pub title: String,
    pub stable_version: String,
    pub homepage: Option<String>,
    pub fetched_at: String,
}

impl From<&VersionEntry> for VersionResponse {
    fn from(v: &VersionEntry) -> Self {
        Self {
            page: v.page.clone(),
            title: infobox::title(&v.page),
            stable_version: v.stable_version.clone(),
            homepage: v.homepage.clone(),
            fetched_at: v.fetched_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub page: String,
    pub title: String,
    pub source_url: String,
    pub feed_url: String,
    pub current: VersionResponse,
    pub history: Vec<VersionResponse>,
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Most recently updated pages.
pub async fn recent(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<RecentParams>,
) -> Result<Json<JSend<Vec<VersionResponse>>>, ApiError> {
    let limit = params.limit.unwrap_or(state.config.recent_limit);
    let entries = state.store.recent(limit).await?;
    Ok(JSend::success(entries.iter().map(Into::into).collect()))
}

/// Every known page with its current version, by key.
pub async fn all_pages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<VersionResponse>>>, ApiError> {
    let mut entries = state.store.recent(usize::MAX).await?;
    entries.sort_by(|a, b| a.page.cmp(&b.page));
    Ok(JSend::success(entries.iter().map(Into::into).collect()))
}

/// A page with its history. Aliases redirect permanently to the canonical key.
pub async fn get_page(
    State(state): State<Arc<AppState>>,
    Path(page): Path<String>,
) -> Result<Response, ApiError> {
    let current = match state.engine.current(&page).await {
        Ok(current) => current,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(page = %page, "page not found");
            return Err(ApiError::page_not_found(
                &page,
                state.config.wikipedia_page_url(&page),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let base = &state.config.server.base_url;
    if current.page != page {
        let location = format!("{base}/p/{}", encode_page(&current.page));
        return Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response());
    }

    let history = state.store.history(std::slice::from_ref(&current.page)).await?;

    Ok(JSend::success(PageResponse {
        title: infobox::title(&current.page),
        source_url: state.config.wikipedia_page_url(&current.page),
        feed_url: format!("{base}/p/{}/feed", encode_page(&current.page)),
        current: (&current).into(),
        history: history.iter().map(Into::into).collect(),
        page: current.page,
    })
    .into_response())
}
