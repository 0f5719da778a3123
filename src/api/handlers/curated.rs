use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::pages::VersionResponse;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::curated::Persisted;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// Form contents: checked pages plus free text, one page per line.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CuratedRequest {
    #[serde(default)]
    pub pages: Vec<String>,
    #[serde(default)]
    pub etc: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CuratedResponse {
    pub id: String,
    pub title: String,
    pub default_title: String,
    pub custom_title: Option<String>,
    pub pages: Vec<String>,
    pub versions: Vec<VersionResponse>,
    pub feed_url: String,
    pub last_updated: String,
    pub used_at: Option<String>,
}

fn rejected(outcome: Persisted) -> ApiError {
    match outcome {
        Persisted::Rejected(errors) => {
            ApiError::unprocessable("Some pages could not be added", &errors)
        }
        _ => ApiError::unprocessable("No pages selected", &[]),
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_curated(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CuratedRequest>,
) -> Result<(StatusCode, Json<JSend<CreatedResponse>>), ApiError> {
    let resolution = state.curated.resolve_input(&req.etc, &req.pages).await?;

    match state.curated.create(resolution).await? {
        Persisted::Saved(id) => Ok((
            StatusCode::CREATED,
            JSend::success(CreatedResponse {
                url: format!("{}/curated/{id}", state.config.server.base_url),
                id,
            }),
        )),
        outcome => Err(rejected(outcome)),
    }
}

pub async fn get_curated(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<CuratedResponse>>, ApiError> {
    let curated = state
        .store
        .load_curated(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Curated list not found"))?;

    let mut versions = Vec::new();
    for page in &curated.pages {
        if let Some(entry) = state.store.latest(page).await? {
            versions.push(VersionResponse::from(&entry));
        }
    }

    Ok(JSend::success(CuratedResponse {
        title: curated.title(),
        default_title: curated.default_title(),
        feed_url: format!("{}/curated/{id}/feed", state.config.server.base_url),
        last_updated: curated.last_updated.to_rfc3339(),
        used_at: curated.used_at.map(|t| t.to_rfc3339()),
        custom_title: curated.custom_title,
        pages: curated.pages,
        versions,
        id,
    }))
}

pub async fn update_curated(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<CuratedRequest>,
) -> Result<Json<JSend<CreatedResponse>>, ApiError> {
    if state.store.load_curated(&id).await?.is_none() {
        return Err(ApiError::not_found("Curated list not found"));
    }

    let resolution = state.curated.resolve_input(&req.etc, &req.pages).await?;

    match state.curated.edit(&id, resolution, &req.title).await? {
        Persisted::Saved(id) => Ok(JSend::success(CreatedResponse {
            url: format!("{}/curated/{id}", state.config.server.base_url),
            id,
        })),
        outcome => Err(rejected(outcome)),
    }
}
