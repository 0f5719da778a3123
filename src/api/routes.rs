use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::recent))
        .route("/p", get(handlers::all_pages))
        .route("/p/:page", get(handlers::get_page))
        .route("/p/:page/feed", get(handlers::page_feed))
        // Feeds
        .route("/adhoc/feed", get(handlers::adhoc_feed))
        // Curated lists
        .route("/curated", post(handlers::create_curated))
        .route(
            "/curated/:id",
            get(handlers::get_curated).put(handlers::update_curated),
        )
        .route("/curated/:id/feed", get(handlers::curated_feed))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
